//! Route state hook: use_route_state
//!
//! Values live in the state map of the current history entry, so going back
//! or forward restores whatever the target entry held.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use vista_core::reactive::Signal;
use vista_history::{History, StateChange};

use crate::app::ViewScope;
use crate::context::WeakViewContext;
use crate::error::ViewError;

/// Value and setter returned by [`use_route_state`].
pub struct RouteStateHandle<T: 'static> {
	key: Rc<str>,
	value: Signal<T>,
	history: History,
	context: WeakViewContext,
	snapshot: bool,
}

impl<T: 'static> Clone for RouteStateHandle<T> {
	fn clone(&self) -> Self {
		Self {
			key: Rc::clone(&self.key),
			value: self.value.clone(),
			history: self.history.clone(),
			context: self.context.clone(),
			snapshot: self.snapshot,
		}
	}
}

impl<T> RouteStateHandle<T>
where
	T: Serialize + DeserializeOwned + Clone + PartialEq + 'static,
{
	/// The state key.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Current value.
	pub fn get(&self) -> T {
		self.value.get()
	}

	/// Observable value; updated by writes and by back/forward navigation.
	pub fn signal(&self) -> Signal<T> {
		self.value.clone()
	}

	/// Stores `value` in the current history entry.
	///
	/// With snapshots enabled, replacing a different stored value first
	/// clones the entry forward, so going back restores the old value.
	/// Writes from a view that is no longer active are ignored and return
	/// [`StateChange::Unchanged`].
	///
	/// # Errors
	///
	/// Returns [`ViewError::History`] if `value` cannot be serialized.
	pub fn set(&self, value: T) -> Result<StateChange, ViewError> {
		let active = self.context.upgrade().is_some_and(|c| c.is_active());
		if !active {
			tracing::debug!(key = %self.key, "ignoring route state write from inactive view");
			return Ok(StateChange::Unchanged);
		}
		let change = self.history.set_state_as(&self.key, &value, self.snapshot)?;
		self.value.set_if_changed(value);
		Ok(change)
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for RouteStateHandle<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteStateHandle")
			.field("key", &self.key)
			.field("value", &self.value)
			.field("snapshot", &self.snapshot)
			.finish()
	}
}

/// Binds `key` of the current history entry's state map to the view.
///
/// When the entry holds no value yet, `initial` is written to it (only while
/// the view is active). After back/forward navigation the handle reflects
/// the value of the newly current entry, falling back to `initial`.
///
/// # Example
///
/// ```ignore
/// let list = Loader::sync(|scope| {
///     let sort = use_route_state(scope, "sort", "date".to_string(), true);
///     sort.set("sender".to_string())?; // a new history entry
///     Ok(Markup::text(sort.get()))
/// });
/// ```
pub fn use_route_state<T>(scope: &ViewScope, key: &str, initial: T, snapshot: bool) -> RouteStateHandle<T>
where
	T: Serialize + DeserializeOwned + Clone + PartialEq + 'static,
{
	let history = scope.history().clone();
	let context = scope.context();
	let states = history.current_states();

	let stored = states.get_as::<T>(key).unwrap_or_else(|error| {
		tracing::warn!(key, %error, "discarding undecodable route state");
		None
	});
	let value = match stored {
		Some(value) => value,
		None => {
			if context.is_active() {
				if let Err(error) = states.insert_as(key, &initial) {
					tracing::warn!(key, %error, "failed to store initial route state");
				}
			}
			initial.clone()
		}
	};

	let value = Signal::new(value);
	let key: Rc<str> = Rc::from(key);
	let subscription = {
		let value = value.clone();
		let reader = history.clone();
		let key = Rc::clone(&key);
		let weak = context.downgrade();
		history.on_pop_state(move |_| {
			if !weak.upgrade().is_some_and(|c| c.is_active()) {
				return;
			}
			let restored = reader
				.current_states()
				.get_as::<T>(&key)
				.ok()
				.flatten()
				.unwrap_or_else(|| initial.clone());
			value.set_if_changed(restored);
		})
	};
	context.retain(subscription);

	RouteStateHandle {
		key,
		value,
		history,
		context: context.downgrade(),
		snapshot,
	}
}
