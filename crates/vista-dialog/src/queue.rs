//! Dialog admission.
//!
//! Every [`Dialog::open`](crate::Dialog::open) call enqueues an entry. Entries
//! are admitted strictly in FIFO order whenever the queue has a free slot:
//! one slot in shared mode, `concurrent` slots (unbounded by default) in
//! multiple mode. Closing an active entry by any means frees its slot and
//! admits the next one.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use serde_json::Value;
use vista_core::reactive::Signal;
use vista_views::Element;

use crate::dialog::{CommitHook, RenderDialog};
use crate::error::DialogError;

/// Tag of the element a dialog is rendered into.
pub const DIALOG_ROOT_TAG: &str = "vista-dialog";

/// How many dialogs may be on screen at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DialogMode {
	/// One active dialog, rendered into a single shared root.
	#[default]
	Shared,
	/// Several active dialogs, each in its own root.
	Multiple,
}

/// Options of a [`DialogQueue`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialogQueueOptions {
	/// Admission mode.
	pub mode: DialogMode,
	/// Maximum number of active dialogs in [`DialogMode::Multiple`].
	/// `None` means unbounded. Ignored in shared mode.
	pub concurrent: Option<usize>,
}

impl DialogQueueOptions {
	/// One dialog at a time.
	pub fn shared() -> Self {
		Self {
			mode: DialogMode::Shared,
			concurrent: None,
		}
	}

	/// Up to `concurrent` dialogs at a time.
	pub fn multiple(concurrent: Option<usize>) -> Self {
		Self {
			mode: DialogMode::Multiple,
			concurrent,
		}
	}
}

/// Lifecycle state of a queued dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
	/// Waiting for a free slot.
	Pending,
	/// Rendered and interactive.
	Active,
	/// Resolved; the entry is gone from the queue.
	Closed,
}

struct Entry {
	id: u64,
	render: RenderDialog,
	on_commit: Option<CommitHook>,
	state: Cell<DialogState>,
	result: RefCell<Option<oneshot::Sender<Option<Value>>>>,
	mounted: RefCell<Option<Element>>,
	busy: Signal<usize>,
	queue: Weak<QueueInner>,
}

struct QueueInner {
	mode: DialogMode,
	capacity: usize,
	container: Element,
	shared_root: Option<Element>,
	pending: RefCell<VecDeque<Rc<Entry>>>,
	active: RefCell<Vec<Rc<Entry>>>,
	pending_count: Signal<usize>,
	next_id: Cell<u64>,
}

/// Admission controller for dialogs.
///
/// Cheap to clone; every clone controls the same queue.
#[derive(Clone)]
pub struct DialogQueue {
	inner: Rc<QueueInner>,
}

impl DialogQueue {
	/// Creates a queue rendering its dialogs under `container`.
	pub fn new(options: DialogQueueOptions, container: Element) -> Self {
		let capacity = match options.mode {
			DialogMode::Shared => 1,
			DialogMode::Multiple => match options.concurrent {
				Some(0) => {
					tracing::warn!("dialog queue with zero concurrency; admitting one at a time");
					1
				}
				Some(n) => n,
				None => usize::MAX,
			},
		};
		let shared_root = (options.mode == DialogMode::Shared).then(|| {
			let root = Element::new(DIALOG_ROOT_TAG);
			container.append_child(&root);
			root
		});
		Self {
			inner: Rc::new(QueueInner {
				mode: options.mode,
				capacity,
				container,
				shared_root,
				pending: RefCell::new(VecDeque::new()),
				active: RefCell::new(Vec::new()),
				pending_count: Signal::new(0),
				next_id: Cell::new(1),
			}),
		}
	}

	/// Admission mode.
	pub fn mode(&self) -> DialogMode {
		self.inner.mode
	}

	/// Element the dialogs are rendered under.
	pub fn container(&self) -> &Element {
		&self.inner.container
	}

	/// Number of queued dialogs not yet admitted.
	pub fn pending_count(&self) -> Signal<usize> {
		self.inner.pending_count.clone()
	}

	/// Number of active dialogs.
	pub fn active_count(&self) -> usize {
		self.inner.active.borrow().len()
	}

	/// Handles of the active dialogs, oldest first.
	pub fn active(&self) -> Vec<DialogHandle> {
		self.inner
			.active
			.borrow()
			.iter()
			.map(|entry| DialogHandle {
				entry: Rc::clone(entry),
			})
			.collect()
	}

	/// Resolves every queued dialog to `None`. Active dialogs stay open.
	pub fn dismiss_pending(&self) {
		let drained: Vec<Rc<Entry>> = self.inner.pending.borrow_mut().drain(..).collect();
		self.inner.sync_pending_count();
		if !drained.is_empty() {
			tracing::debug!(count = drained.len(), "queued dialogs dismissed");
		}
		for entry in drained {
			entry.state.set(DialogState::Closed);
			entry.resolve(None);
		}
	}

	/// Dismisses queued dialogs and closes active ones.
	///
	/// In shared mode the active dialog resolves to `value`; every other
	/// dialog resolves to `None`.
	pub fn dismiss_all(&self, value: Option<Value>) {
		self.dismiss_pending();
		let active: Vec<Rc<Entry>> = self.inner.active.borrow().clone();
		for entry in active {
			let value = match self.inner.mode {
				DialogMode::Shared => value.clone(),
				DialogMode::Multiple => None,
			};
			close(&entry, value);
		}
	}

	pub(crate) fn enqueue(
		&self,
		render: RenderDialog,
		on_commit: Option<CommitHook>,
	) -> LocalBoxFuture<'static, Option<Value>> {
		let id = self.inner.next_id.get();
		self.inner.next_id.set(id + 1);
		let (sender, receiver) = oneshot::channel();
		let entry = Rc::new(Entry {
			id,
			render,
			on_commit,
			state: Cell::new(DialogState::Pending),
			result: RefCell::new(Some(sender)),
			mounted: RefCell::new(None),
			busy: Signal::new(0),
			queue: Rc::downgrade(&self.inner),
		});
		self.inner.pending.borrow_mut().push_back(entry);
		self.inner.sync_pending_count();
		tracing::debug!(id, "dialog queued");

		QueueInner::admit(&self.inner);
		async move { receiver.await.ok().flatten() }.boxed_local()
	}
}

impl fmt::Debug for DialogQueue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DialogQueue")
			.field("mode", &self.inner.mode)
			.field("active", &self.active_count())
			.field("pending", &self.inner.pending_count.get())
			.finish()
	}
}

impl QueueInner {
	fn sync_pending_count(&self) {
		let count = self.pending.borrow().len();
		self.pending_count.set_if_changed(count);
	}

	fn admit(self: &Rc<Self>) {
		loop {
			let next = {
				if self.active.borrow().len() >= self.capacity {
					break;
				}
				self.pending.borrow_mut().pop_front()
			};
			let Some(entry) = next else {
				break;
			};
			entry.state.set(DialogState::Active);
			self.active.borrow_mut().push(Rc::clone(&entry));
			self.sync_pending_count();
			self.render(&entry);
		}
	}

	fn render(&self, entry: &Rc<Entry>) {
		let root = match &self.shared_root {
			Some(root) => root.clone(),
			None => {
				let root = Element::new(DIALOG_ROOT_TAG);
				self.container.append_child(&root);
				root
			}
		};
		let handle = DialogHandle {
			entry: Rc::clone(entry),
		};
		let content = (entry.render)(&handle);
		if entry.state.get() != DialogState::Active {
			if self.shared_root.is_none() {
				root.remove();
			}
			return;
		}
		root.append_child(&content);
		let mounted = if self.shared_root.is_some() { content } else { root };
		*entry.mounted.borrow_mut() = Some(mounted);
		tracing::info!(id = entry.id, mode = ?self.mode, "dialog opened");
	}
}

impl Entry {
	fn resolve(&self, value: Option<Value>) {
		let sender = self.result.borrow_mut().take();
		if let Some(sender) = sender {
			let _ = sender.send(value);
		}
	}
}

fn close(entry: &Rc<Entry>, value: Option<Value>) -> bool {
	let previous = entry.state.replace(DialogState::Closed);
	let queue = entry.queue.upgrade();
	match (previous, &queue) {
		(DialogState::Closed, _) => return false,
		(DialogState::Pending, Some(queue)) => {
			queue.pending.borrow_mut().retain(|e| !Rc::ptr_eq(e, entry));
			queue.sync_pending_count();
		}
		(DialogState::Active, Some(queue)) => {
			queue.active.borrow_mut().retain(|e| !Rc::ptr_eq(e, entry));
		}
		(_, None) => {}
	}
	let mounted = entry.mounted.borrow_mut().take();
	if let Some(element) = mounted {
		element.remove();
	}
	tracing::debug!(id = entry.id, closed_from = ?previous, "dialog closed");
	entry.resolve(value);

	if let Some(queue) = queue {
		QueueInner::admit(&queue);
	}
	true
}

/// Handle to one queued dialog, passed to its render callback.
#[derive(Clone)]
pub struct DialogHandle {
	entry: Rc<Entry>,
}

impl DialogHandle {
	/// Identifier, unique within the queue.
	pub fn id(&self) -> u64 {
		self.entry.id
	}

	/// Current lifecycle state.
	pub fn state(&self) -> DialogState {
		self.entry.state.get()
	}

	/// Whether the dialog is active.
	pub fn is_open(&self) -> bool {
		self.state() == DialogState::Active
	}

	/// Number of commits in flight.
	pub fn busy(&self) -> Signal<usize> {
		self.entry.busy.clone()
	}

	/// Closes the dialog, resolving its `open()` future with `value`.
	///
	/// Returns `false` if it was already closed.
	pub fn close(&self, value: Option<Value>) -> bool {
		close(&self.entry, value)
	}

	/// Closes the dialog without a result.
	pub fn dismiss(&self) -> bool {
		self.close(None)
	}

	/// Runs the commit hook with `value` and closes the dialog with it.
	///
	/// If the hook rejects, the dialog stays open and the error is returned.
	/// [`DialogHandle::busy`] counts the commit while the hook runs.
	///
	/// # Errors
	///
	/// [`DialogError::Closed`] if the dialog is not active when the commit
	/// starts or finishes, otherwise whatever the hook returned.
	pub fn commit(&self, value: Value) -> LocalBoxFuture<'static, Result<(), DialogError>> {
		let entry = Rc::clone(&self.entry);
		async move {
			if entry.state.get() != DialogState::Active {
				return Err(DialogError::Closed);
			}
			if let Some(on_commit) = entry.on_commit.clone() {
				entry.busy.update(|n| *n += 1);
				let outcome = on_commit(value.clone()).await;
				entry.busy.update(|n| *n = n.saturating_sub(1));
				if let Err(error) = outcome {
					tracing::warn!(id = entry.id, %error, "dialog commit rejected");
					return Err(error);
				}
			}
			if close(&entry, Some(value)) {
				Ok(())
			} else {
				Err(DialogError::Closed)
			}
		}
		.boxed_local()
	}
}

impl fmt::Debug for DialogHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DialogHandle")
			.field("id", &self.entry.id)
			.field("state", &self.entry.state.get())
			.field("busy", &self.entry.busy.get())
			.finish()
	}
}
