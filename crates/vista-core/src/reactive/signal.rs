//! Signal - Observable Value
//!
//! `Signal<T>` holds a value and notifies subscribers whenever it is set.
//! It is the observable used for route state, view context `page`/`active`
//! flags and dialog counters.
//!
//! ## Key Features
//!
//! - **Explicit Subscription**: listeners register with [`Signal::subscribe`]
//!   and are removed when the returned [`Subscription`] is dropped.
//! - **Change Gate**: [`Signal::set_if_changed`] only notifies when the value
//!   actually differs.
//! - **Lightweight**: `Signal<T>` is an `Rc` handle, cheap to clone and pass around.
//! - **Re-entrancy Safe**: the value borrow is released before subscribers run,
//!   so a subscriber may read or set the signal again.
//!
//! ## Example
//!
//! ```ignore
//! use vista_core::reactive::Signal;
//!
//! let count = Signal::new(0);
//! let _sub = count.subscribe(|n| println!("count is now {n}"));
//!
//! count.set(42);
//! count.update(|n| *n += 1);
//! assert_eq!(count.get(), 43);
//! ```

use core::cell::RefCell;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

extern crate alloc;
use alloc::rc::Rc;

use super::emitter::{Emitter, Subscription};

/// Unique identifier of a signal, mainly useful in logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignalId(u64);

impl SignalId {
	fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}
}

/// An observable value.
///
/// ## Cloning
///
/// `Signal<T>` implements `Clone` and shares the value via `Rc<RefCell<T>>`.
/// All clones of the same Signal share the same underlying value and subscribers.
pub struct Signal<T: 'static> {
	/// Unique identifier for this signal
	id: SignalId,
	/// The actual value, shared via reference counting
	value: Rc<RefCell<T>>,
	/// Change listeners
	changed: Emitter<T>,
}

impl<T: 'static> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			value: Rc::clone(&self.value),
			changed: self.changed.clone(),
		}
	}
}

impl<T: 'static> Signal<T> {
	/// Create a new Signal with the given initial value
	///
	/// # Example
	///
	/// ```ignore
	/// let count = Signal::new(0);
	/// assert_eq!(count.get(), 0);
	/// ```
	pub fn new(value: T) -> Self {
		Self {
			id: SignalId::next(),
			value: Rc::new(RefCell::new(value)),
			changed: Emitter::new(),
		}
	}

	/// Get a clone of the current value.
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.value.borrow().clone()
	}

	/// Run `f` against the current value without cloning it.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.value.borrow())
	}

	/// Set the signal to a new value and notify subscribers.
	pub fn set(&self, value: T)
	where
		T: Clone,
	{
		*self.value.borrow_mut() = value;
		self.notify();
	}

	/// Set the signal only if the new value differs from the current one.
	///
	/// Returns `true` when the value changed and subscribers were notified.
	pub fn set_if_changed(&self, value: T) -> bool
	where
		T: Clone + PartialEq,
	{
		if *self.value.borrow() == value {
			return false;
		}
		self.set(value);
		true
	}

	/// Update the signal's value using a function
	///
	/// Subscribers are notified once, after `f` returns.
	///
	/// # Example
	///
	/// ```ignore
	/// let count = Signal::new(0);
	/// count.update(|n| *n += 1);
	/// assert_eq!(count.get(), 1);
	/// ```
	pub fn update<F>(&self, f: F)
	where
		F: FnOnce(&mut T),
		T: Clone,
	{
		f(&mut *self.value.borrow_mut());
		self.notify();
	}

	/// Register a change listener.
	///
	/// The listener receives the value that was set. It is not called for the
	/// value the signal holds at subscription time.
	#[must_use = "dropping the subscription unsubscribes the listener"]
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&T) + 'static,
	{
		self.changed.subscribe(listener)
	}

	/// Get the id of this signal.
	pub fn id(&self) -> SignalId {
		self.id
	}

	fn notify(&self)
	where
		T: Clone,
	{
		// Clone out so that subscribers can borrow the signal again.
		let current = self.value.borrow().clone();
		self.changed.emit(&current);
	}
}

impl<T: Default + 'static> Default for Signal<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("id", &self.id)
			.field("value", &*self.value.borrow())
			.finish()
	}
}
