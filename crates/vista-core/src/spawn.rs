//! Task spawning for the single-threaded scheduler.
//!
//! Every suspension point of the view engine (component loading, outro
//! animations, deferred redirects) runs as a local task on a [`Spawner`].
//! The spawner wraps any [`LocalSpawn`] implementation, so the host decides
//! which executor drives the tasks: `futures::executor::LocalPool` in tests,
//! a browser microtask queue in a WASM host.

use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

extern crate alloc;
use alloc::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt};

/// Cheaply clonable handle to a local executor.
#[derive(Clone)]
pub struct Spawner {
	inner: Rc<dyn LocalSpawn>,
}

impl Spawner {
	/// Wraps a local executor handle.
	pub fn new<S>(spawner: S) -> Self
	where
		S: LocalSpawn + 'static,
	{
		Self {
			inner: Rc::new(spawner),
		}
	}

	/// Spawns a fire-and-forget task.
	///
	/// A spawn failure (executor shut down) is logged and the task is dropped.
	pub fn spawn<F>(&self, task: F)
	where
		F: Future<Output = ()> + 'static,
	{
		if let Err(error) = self.inner.spawn_local(task) {
			tracing::error!(%error, "failed to spawn local task");
		}
	}
}

impl fmt::Debug for Spawner {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Spawner").finish_non_exhaustive()
	}
}

/// Returns a future that yields to the executor once before completing.
///
/// Used to let work queued during the current tick run before continuing.
pub fn yield_now() -> YieldNow {
	YieldNow { yielded: false }
}

/// Future returned by [`yield_now`].
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct YieldNow {
	yielded: bool,
}

impl Future for YieldNow {
	type Output = ();

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
		if self.yielded {
			return Poll::Ready(());
		}
		self.yielded = true;
		cx.waker().wake_by_ref();
		Poll::Pending
	}
}
