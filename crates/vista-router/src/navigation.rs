//! Navigation requests and their completion tokens.
//!
//! Every navigation carries a [`NavigationToken`]. Anything that needs the
//! navigation to wait (a view still loading, a redirect in flight) registers
//! a future on the token; the navigation's own future resolves once every
//! registered future, including ones registered while waiting, has resolved.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde_json::Value;
use vista_history::EntryKey;

/// How a navigation was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationType {
	/// The first render of the application.
	Initial,
	/// A new history entry was pushed.
	Push,
	/// The current history entry was rewritten.
	Replace,
	/// The history cursor moved backwards.
	Back,
	/// The history cursor moved forwards.
	Forward,
}

impl NavigationType {
	/// Whether the navigation restores an existing history entry.
	pub fn is_traversal(self) -> bool {
		matches!(self, Self::Back | Self::Forward)
	}
}

impl fmt::Display for NavigationType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Initial => "initial",
			Self::Push => "push",
			Self::Replace => "replace",
			Self::Back => "back",
			Self::Forward => "forward",
		};
		f.write_str(name)
	}
}

/// Options for [`Router::navigate`](crate::Router::navigate).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigateOptions {
	/// Rewrite the current entry instead of pushing a new one.
	pub replace: bool,
	/// Data stored on the history entry.
	pub data: Option<Value>,
}

impl NavigateOptions {
	/// Options for a push navigation.
	pub fn push() -> Self {
		Self::default()
	}

	/// Options for a replace navigation.
	pub fn replace() -> Self {
		Self {
			replace: true,
			data: None,
		}
	}

	/// Attaches data to the history entry.
	pub fn with_data(mut self, data: Value) -> Self {
		self.data = Some(data);
		self
	}
}

/// Outcome of a settled navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigateResult {
	/// Full path that was navigated to.
	pub path: String,
	/// How the navigation happened.
	pub navigation_type: NavigationType,
	/// Key of the history entry that became current.
	pub key: EntryKey,
}

struct TokenInner {
	id: u64,
	navigation_type: NavigationType,
	waits: RefCell<VecDeque<LocalBoxFuture<'static, ()>>>,
}

/// Completion tracker for one navigation.
///
/// Clones share the same set of pending futures.
#[derive(Clone)]
pub struct NavigationToken {
	inner: Rc<TokenInner>,
}

impl NavigationToken {
	pub(crate) fn new(id: u64, navigation_type: NavigationType) -> Self {
		Self {
			inner: Rc::new(TokenInner {
				id,
				navigation_type,
				waits: RefCell::new(VecDeque::new()),
			}),
		}
	}

	/// Sequence number of the navigation.
	pub fn id(&self) -> u64 {
		self.inner.id
	}

	/// How the navigation was triggered.
	pub fn navigation_type(&self) -> NavigationType {
		self.inner.navigation_type
	}

	/// Delays completion of the navigation until `future` resolves.
	pub fn wait_for<F>(&self, future: F)
	where
		F: Future<Output = ()> + 'static,
	{
		self.inner.waits.borrow_mut().push_back(future.boxed_local());
	}

	/// Number of futures not yet awaited.
	pub fn pending(&self) -> usize {
		self.inner.waits.borrow().len()
	}

	/// Resolves once every registered future has resolved.
	///
	/// Futures registered while awaiting are awaited too.
	pub fn settled(&self) -> impl Future<Output = ()> + 'static {
		let token = self.clone();
		async move {
			loop {
				let next = token.inner.waits.borrow_mut().pop_front();
				match next {
					Some(wait) => wait.await,
					None => break,
				}
			}
		}
	}

	/// Returns whether both handles track the same navigation.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for NavigationToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NavigationToken")
			.field("id", &self.inner.id)
			.field("navigation_type", &self.inner.navigation_type)
			.field("pending", &self.pending())
			.finish()
	}
}

/// Dispatched before a navigation updates the route.
#[derive(Debug, Clone)]
pub struct PageLoadEvent {
	/// Path being navigated to.
	pub path: String,
	/// The navigation's completion token.
	pub token: NavigationToken,
}

impl PageLoadEvent {
	/// How the navigation was triggered.
	pub fn navigation_type(&self) -> NavigationType {
		self.token.navigation_type()
	}

	/// Delays completion of the navigation until `future` resolves.
	pub fn wait_for<F>(&self, future: F)
	where
		F: Future<Output = ()> + 'static,
	{
		self.token.wait_for(future);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::channel::oneshot;
	use futures::executor::LocalPool;
	use futures::task::LocalSpawnExt;
	use rstest::rstest;
	use std::cell::Cell;

	#[rstest]
	fn test_settled_without_waits_is_ready() {
		let token = NavigationToken::new(1, NavigationType::Push);
		assert!(token.settled().now_or_never().is_some());
	}

	#[rstest]
	fn test_settled_awaits_nested_waits() {
		let mut pool = LocalPool::new();
		let token = NavigationToken::new(1, NavigationType::Push);
		let (outer_tx, outer_rx) = oneshot::channel::<()>();
		let (inner_tx, inner_rx) = oneshot::channel::<()>();

		let nested = token.clone();
		token.wait_for(async move {
			let _ = outer_rx.await;
			nested.wait_for(async move {
				let _ = inner_rx.await;
			});
		});

		let done = Rc::new(Cell::new(false));
		let d = Rc::clone(&done);
		let settled = token.settled();
		pool.spawner()
			.spawn_local(async move {
				settled.await;
				d.set(true);
			})
			.unwrap();

		pool.run_until_stalled();
		assert!(!done.get());

		outer_tx.send(()).unwrap();
		pool.run_until_stalled();
		assert!(!done.get());
		assert_eq!(token.pending(), 0);

		inner_tx.send(()).unwrap();
		pool.run_until_stalled();
		assert!(done.get());
	}

	#[rstest]
	fn test_options_builders() {
		let options = NavigateOptions::replace().with_data(serde_json::json!({"a": 1}));
		assert!(options.replace);
		assert!(options.data.is_some());
		assert!(!NavigateOptions::push().replace);
	}
}
