//! Dialog definitions.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde_json::Value;
use vista_views::Element;

use crate::error::DialogError;
use crate::queue::{DialogHandle, DialogQueue};

/// Builds a dialog's content when it is admitted.
pub type RenderDialog = Rc<dyn Fn(&DialogHandle) -> Element>;

/// Validates or persists a committed value before the dialog closes.
pub type CommitHook = Rc<dyn Fn(Value) -> LocalBoxFuture<'static, Result<(), DialogError>>>;

/// What a dialog renders, where it queues and how it commits.
#[derive(Clone)]
pub struct DialogOptions {
	queue: DialogQueue,
	render: RenderDialog,
	on_commit: Option<CommitHook>,
}

impl DialogOptions {
	/// A dialog queued on `queue` whose content `render` builds.
	pub fn new<F>(queue: &DialogQueue, render: F) -> Self
	where
		F: Fn(&DialogHandle) -> Element + 'static,
	{
		Self {
			queue: queue.clone(),
			render: Rc::new(render),
			on_commit: None,
		}
	}

	/// Sets the hook run by [`DialogHandle::commit`].
	pub fn on_commit<F, Fut>(mut self, hook: F) -> Self
	where
		F: Fn(Value) -> Fut + 'static,
		Fut: Future<Output = Result<(), DialogError>> + 'static,
	{
		self.on_commit = Some(Rc::new(move |value: Value| hook(value).boxed_local()));
		self
	}
}

impl fmt::Debug for DialogOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DialogOptions")
			.field("queue", &self.queue)
			.field("has_commit_hook", &self.on_commit.is_some())
			.finish()
	}
}

/// A dialog that can be opened any number of times.
#[derive(Debug, Clone)]
pub struct Dialog {
	options: DialogOptions,
}

impl Dialog {
	/// Queues the dialog.
	///
	/// Resolves with the value it was closed or committed with, or `None`
	/// when it was dismissed.
	pub fn open(&self) -> LocalBoxFuture<'static, Option<Value>> {
		self.options
			.queue
			.enqueue(Rc::clone(&self.options.render), self.options.on_commit.clone())
	}

	/// The queue the dialog opens on.
	pub fn queue(&self) -> &DialogQueue {
		&self.options.queue
	}
}

/// Creates a dialog from `options`.
pub fn create_dialog(options: DialogOptions) -> Dialog {
	Dialog { options }
}
