//! In-memory browser history with a state map per entry.
//!
//! `History` models the session history the way a browser does: a list of
//! entries and a cursor. Pushing drops every entry after the cursor, replacing
//! rewrites the current entry in place and traversal moves the cursor.
//!
//! Each entry owns a [`StateMap`]. Views persist their per-entry state there,
//! so going back or forward restores exactly what the target entry held.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use vista_core::reactive::{Emitter, Subscription};

use crate::error::HistoryError;
use crate::state::StateMap;

/// Opaque identity of one history slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryKey(u64);

/// One history slot.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
	key: EntryKey,
	path: String,
	data: Option<Value>,
	states: StateMap,
}

impl HistoryEntry {
	/// The slot's identity.
	pub fn key(&self) -> EntryKey {
		self.key
	}

	/// The full path (including query and hash) stored in the slot.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Navigation data attached when the slot was created.
	pub fn data(&self) -> Option<&Value> {
		self.data.as_ref()
	}

	/// The slot's state map.
	pub fn states(&self) -> &StateMap {
		&self.states
	}
}

/// Payload of a pop-state notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopStateEvent {
	/// Key of the entry that became current.
	pub key: EntryKey,
	/// Path of the entry that became current.
	pub path: String,
	/// Cursor movement that produced the event.
	pub delta: isize,
}

/// Outcome of [`History::set_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
	/// The stored value already equalled the new one; nothing was written.
	Unchanged,
	/// The current entry's map was updated in place.
	Updated,
	/// A new entry was pushed first and the value written there.
	Snapshot,
}

struct HistoryInner {
	entries: RefCell<Vec<HistoryEntry>>,
	index: Cell<usize>,
	next_key: Cell<u64>,
	last_delta: Cell<isize>,
	pop_state: Emitter<PopStateEvent>,
}

/// Session history with per-entry state.
///
/// Cloning a `History` yields another handle to the same session.
#[derive(Clone)]
pub struct History {
	inner: Rc<HistoryInner>,
}

impl History {
	/// Creates a history holding a single entry for `initial_path`.
	pub fn new(initial_path: impl Into<String>) -> Self {
		let inner = Rc::new(HistoryInner {
			entries: RefCell::new(Vec::new()),
			index: Cell::new(0),
			next_key: Cell::new(0),
			last_delta: Cell::new(0),
			pop_state: Emitter::new(),
		});
		let history = Self { inner };
		let first = history.new_entry(initial_path.into(), None, StateMap::new());
		history.inner.entries.borrow_mut().push(first);
		history
	}

	fn new_entry(&self, path: String, data: Option<Value>, states: StateMap) -> HistoryEntry {
		let key = self.inner.next_key.get();
		self.inner.next_key.set(key + 1);
		HistoryEntry {
			key: EntryKey(key),
			path,
			data,
			states,
		}
	}

	/// Returns a copy of the current entry.
	pub fn current(&self) -> HistoryEntry {
		let entries = self.inner.entries.borrow();
		entries[self.inner.index.get()].clone()
	}

	/// Returns the state map bound to the current entry.
	pub fn current_states(&self) -> StateMap {
		self.current().states
	}

	/// Number of entries in the session.
	pub fn len(&self) -> usize {
		self.inner.entries.borrow().len()
	}

	/// A session always holds at least one entry.
	pub fn is_empty(&self) -> bool {
		false
	}

	/// Cursor position.
	pub fn index(&self) -> usize {
		self.inner.index.get()
	}

	/// Paths of all entries, oldest first.
	pub fn paths(&self) -> Vec<String> {
		self.inner
			.entries
			.borrow()
			.iter()
			.map(|e| e.path.clone())
			.collect()
	}

	/// Appends a new entry after the cursor, dropping forward entries.
	pub fn push(&self, path: impl Into<String>, data: Option<Value>) -> EntryKey {
		self.push_entry(path.into(), data, StateMap::new())
	}

	fn push_entry(&self, path: String, data: Option<Value>, states: StateMap) -> EntryKey {
		let entry = self.new_entry(path, data, states);
		let key = entry.key;
		let index = self.inner.index.get();
		{
			let mut entries = self.inner.entries.borrow_mut();
			entries.truncate(index + 1);
			entries.push(entry);
		}
		self.inner.index.set(index + 1);
		tracing::debug!(?key, index = index + 1, "history entry pushed");
		key
	}

	/// Rewrites the current entry's path and data.
	///
	/// The entry keeps its key and its state map.
	pub fn replace(&self, path: impl Into<String>, data: Option<Value>) -> EntryKey {
		let index = self.inner.index.get();
		let mut entries = self.inner.entries.borrow_mut();
		let entry = &mut entries[index];
		entry.path = path.into();
		entry.data = data;
		entry.key
	}

	/// Clones the current entry forward into a new entry.
	///
	/// The new entry gets the same path and an independent copy of the
	/// current state map. Forward entries are dropped.
	pub fn snapshot(&self) -> EntryKey {
		let current = self.current();
		self.push_entry(
			current.path.clone(),
			current.data.clone(),
			current.states.deep_clone(),
		)
	}

	/// Moves the cursor by `delta` without notifying listeners.
	///
	/// Returns the entry that became current, or `None` when the target is out
	/// of range (the cursor is left untouched). Call
	/// [`History::dispatch_pop_state`] once dependants are updated.
	pub fn go(&self, delta: isize) -> Option<HistoryEntry> {
		if delta == 0 {
			return None;
		}
		let target = self.inner.index.get() as isize + delta;
		if target < 0 || target as usize >= self.len() {
			return None;
		}
		self.inner.index.set(target as usize);
		self.inner.last_delta.set(delta);
		Some(self.current())
	}

	/// Moves one entry back. See [`History::go`].
	pub fn back(&self) -> Option<HistoryEntry> {
		self.go(-1)
	}

	/// Moves one entry forward. See [`History::go`].
	pub fn forward(&self) -> Option<HistoryEntry> {
		self.go(1)
	}

	/// Moves the cursor and notifies pop-state listeners right away.
	pub fn traverse(&self, delta: isize) -> Option<HistoryEntry> {
		let entry = self.go(delta)?;
		self.dispatch_pop_state();
		Some(entry)
	}

	/// Notifies pop-state listeners about the current entry.
	pub fn dispatch_pop_state(&self) {
		let current = self.current();
		let event = PopStateEvent {
			key: current.key,
			path: current.path,
			delta: self.inner.last_delta.get(),
		};
		self.inner.pop_state.emit(&event);
	}

	/// Registers a pop-state listener.
	#[must_use = "dropping the subscription unsubscribes the listener"]
	pub fn on_pop_state<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&PopStateEvent) + 'static,
	{
		self.inner.pop_state.subscribe(listener)
	}

	/// Writes `value` under `key` in the current entry's map.
	///
	/// When `snapshot` is set and the map already holds a *different* value
	/// for `key`, the current entry is first cloned forward with
	/// [`History::snapshot`] and the value is written to the new entry.
	/// Writing a value equal to the stored one never snapshots and never
	/// writes.
	pub fn set_state(&self, key: &str, value: Value, snapshot: bool) -> StateChange {
		let states = self.current_states();
		let change = match states.get(key) {
			Some(existing) if existing == value => return StateChange::Unchanged,
			Some(_) if snapshot => {
				self.snapshot();
				StateChange::Snapshot
			}
			_ => StateChange::Updated,
		};
		self.current_states().insert(key, value);
		change
	}

	/// Serializing form of [`History::set_state`].
	pub fn set_state_as<T: Serialize>(
		&self,
		key: &str,
		value: &T,
		snapshot: bool,
	) -> Result<StateChange, HistoryError> {
		let value = serde_json::to_value(value).map_err(|source| HistoryError::serialize(key, source))?;
		Ok(self.set_state(key, value, snapshot))
	}
}

impl Default for History {
	fn default() -> Self {
		Self::new("/")
	}
}

impl fmt::Debug for History {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("History")
			.field("len", &self.len())
			.field("index", &self.index())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_push_drops_forward_entries() {
		let history = History::new("/a");
		history.push("/b", None);
		history.push("/c", None);
		history.back();
		history.back();

		history.push("/d", None);
		assert_eq!(history.paths(), vec!["/a", "/d"]);
		assert_eq!(history.index(), 1);
	}

	#[rstest]
	fn test_replace_keeps_key_and_states() {
		let history = History::new("/a");
		let key = history.current().key();
		history.current_states().insert("k", json!(1));

		let replaced = history.replace("/b", Some(json!({"from": "redirect"})));
		assert_eq!(replaced, key);
		assert_eq!(history.current().path(), "/b");
		assert_eq!(history.current_states().get("k"), Some(json!(1)));
		assert_eq!(history.len(), 1);
	}

	#[rstest]
	fn test_go_out_of_range_is_noop() {
		let history = History::new("/a");
		assert!(history.back().is_none());
		assert!(history.forward().is_none());
		assert_eq!(history.index(), 0);
	}

	#[rstest]
	fn test_entries_have_distinct_keys() {
		let history = History::new("/a");
		let a = history.current().key();
		let b = history.push("/b", None);
		let c = history.snapshot();
		assert_ne!(a, b);
		assert_ne!(b, c);
	}

	#[rstest]
	fn test_set_state_unchanged_never_snapshots() {
		let history = History::new("/");
		history.set_state("k", json!("foo"), false);

		let change = history.set_state("k", json!("foo"), true);
		assert_eq!(change, StateChange::Unchanged);
		assert_eq!(history.len(), 1);
	}

	#[rstest]
	fn test_set_state_absent_key_updates_in_place() {
		let history = History::new("/");
		let change = history.set_state("k", json!("foo"), true);
		assert_eq!(change, StateChange::Updated);
		assert_eq!(history.len(), 1);
	}

	#[rstest]
	fn test_set_state_snapshot_clones_forward() {
		let history = History::new("/");
		history.set_state("k", json!("foo"), false);
		history.set_state("other", json!(1), false);

		let change = history.set_state("k", json!("baz"), true);
		assert_eq!(change, StateChange::Snapshot);
		assert_eq!(history.len(), 2);
		assert_eq!(history.current_states().get("k"), Some(json!("baz")));
		assert_eq!(history.current_states().get("other"), Some(json!(1)));

		history.back();
		assert_eq!(history.current_states().get("k"), Some(json!("foo")));
	}

	#[rstest]
	fn test_traverse_dispatches_pop_state() {
		let history = History::new("/a");
		history.push("/b", None);
		let seen = Rc::new(RefCell::new(Vec::new()));

		let s = Rc::clone(&seen);
		let _sub = history.on_pop_state(move |e| s.borrow_mut().push((e.path.clone(), e.delta)));

		history.traverse(-1);
		history.traverse(1);
		assert_eq!(
			*seen.borrow(),
			vec![("/a".to_string(), -1), ("/b".to_string(), 1)]
		);
	}
}
