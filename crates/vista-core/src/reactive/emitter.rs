//! Emitter - Synchronous Event Dispatch
//!
//! `Emitter<E>` keeps an ordered list of listeners and calls them in
//! registration order. Dispatch works on a snapshot of the listener list, so
//! listeners may subscribe or unsubscribe (including themselves) while an event
//! is being delivered:
//!
//! - listeners added during dispatch are not called for the current event;
//! - listeners cancelled during dispatch are skipped if not yet reached.
//!
//! ## Example
//!
//! ```ignore
//! use vista_core::reactive::Emitter;
//!
//! let emitter = Emitter::<u32>::new();
//! let _sub = emitter.subscribe(|n| println!("got {n}"));
//! emitter.emit(&42);
//! ```

use core::cell::{Cell, RefCell};
use core::fmt;

extern crate alloc;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;

/// Boxed listener callback.
type Listener<E> = Rc<dyn Fn(&E) + 'static>;

struct Entry<E: 'static> {
	id: u64,
	alive: Cell<bool>,
	listener: Listener<E>,
}

struct EmitterInner<E: 'static> {
	next_id: Cell<u64>,
	entries: RefCell<Vec<Rc<Entry<E>>>>,
}

/// An ordered, single-threaded event emitter.
///
/// Cloning an `Emitter` yields another handle to the same listener list.
pub struct Emitter<E: 'static> {
	inner: Rc<EmitterInner<E>>,
}

impl<E: 'static> Clone for Emitter<E> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<E: 'static> Default for Emitter<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E: 'static> Emitter<E> {
	/// Creates an emitter with no listeners.
	pub fn new() -> Self {
		Self {
			inner: Rc::new(EmitterInner {
				next_id: Cell::new(0),
				entries: RefCell::new(Vec::new()),
			}),
		}
	}

	/// Registers a listener.
	///
	/// The listener stays registered for as long as the returned
	/// [`Subscription`] is alive.
	#[must_use = "dropping the subscription unsubscribes the listener"]
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&E) + 'static,
	{
		let id = self.inner.next_id.get();
		self.inner.next_id.set(id + 1);

		let entry = Rc::new(Entry {
			id,
			alive: Cell::new(true),
			listener: Rc::new(listener),
		});
		self.inner.entries.borrow_mut().push(Rc::clone(&entry));

		let weak: Weak<EmitterInner<E>> = Rc::downgrade(&self.inner);
		Subscription::new(move || {
			entry.alive.set(false);
			if let Some(inner) = weak.upgrade() {
				inner.entries.borrow_mut().retain(|e| e.id != id);
			}
		})
	}

	/// Delivers `event` to every listener registered before this call.
	pub fn emit(&self, event: &E) {
		let snapshot: Vec<Rc<Entry<E>>> = self.inner.entries.borrow().clone();
		for entry in snapshot {
			if entry.alive.get() {
				(entry.listener)(event);
			}
		}
	}

	/// Returns the number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.inner.entries.borrow().len()
	}
}

impl<E: 'static> fmt::Debug for Emitter<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Emitter")
			.field("listeners", &self.listener_count())
			.finish()
	}
}

/// Guard returned by [`Emitter::subscribe`] and `Signal::subscribe`.
///
/// Dropping it unsubscribes. Call [`Subscription::detach`] to keep the
/// listener registered for the lifetime of the emitter.
pub struct Subscription {
	cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
	/// Creates a subscription that runs `cancel` when dropped.
	pub fn new<F>(cancel: F) -> Self
	where
		F: FnOnce() + 'static,
	{
		Self {
			cancel: Some(Box::new(cancel)),
		}
	}

	/// Unsubscribes now.
	pub fn cancel(mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}

	/// Leaks the listener registration.
	pub fn detach(mut self) {
		self.cancel = None;
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.cancel.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_emit_in_registration_order() {
		let emitter = Emitter::<u32>::new();
		let log = Rc::new(RefCell::new(Vec::new()));

		let l1 = Rc::clone(&log);
		let _a = emitter.subscribe(move |n| l1.borrow_mut().push(("a", *n)));
		let l2 = Rc::clone(&log);
		let _b = emitter.subscribe(move |n| l2.borrow_mut().push(("b", *n)));

		emitter.emit(&7);
		assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
	}

	#[rstest]
	fn test_drop_subscription_unsubscribes() {
		let emitter = Emitter::<()>::new();
		let count = Rc::new(Cell::new(0));

		let c = Rc::clone(&count);
		let sub = emitter.subscribe(move |_| c.set(c.get() + 1));
		emitter.emit(&());
		drop(sub);
		emitter.emit(&());

		assert_eq!(count.get(), 1);
		assert_eq!(emitter.listener_count(), 0);
	}

	#[rstest]
	fn test_cancelled_during_dispatch_is_skipped() {
		let emitter = Emitter::<()>::new();
		let second_called = Rc::new(Cell::new(false));
		let holder: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

		let h = Rc::clone(&holder);
		let _first = emitter.subscribe(move |_| {
			h.borrow_mut().take();
		});
		let flag = Rc::clone(&second_called);
		*holder.borrow_mut() = Some(emitter.subscribe(move |_| flag.set(true)));

		emitter.emit(&());
		assert!(!second_called.get());
	}

	#[rstest]
	fn test_subscribe_during_dispatch_waits_for_next_event() {
		let emitter = Emitter::<()>::new();
		let late_calls = Rc::new(Cell::new(0));
		let subs: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

		let em = emitter.clone();
		let calls = Rc::clone(&late_calls);
		let store = Rc::clone(&subs);
		let _outer = emitter.subscribe(move |_| {
			let calls = Rc::clone(&calls);
			let sub = em.subscribe(move |_| calls.set(calls.get() + 1));
			store.borrow_mut().push(sub);
		});

		emitter.emit(&());
		assert_eq!(late_calls.get(), 0);
		emitter.emit(&());
		assert_eq!(late_calls.get(), 1);
	}

	#[rstest]
	fn test_detach_keeps_listener() {
		let emitter = Emitter::<()>::new();
		let count = Rc::new(Cell::new(0));
		let c = Rc::clone(&count);
		emitter.subscribe(move |_| c.set(c.get() + 1)).detach();

		emitter.emit(&());
		assert_eq!(count.get(), 1);
	}
}
