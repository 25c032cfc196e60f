//! View context tree.
//!
//! Every mounted view gets a [`ViewContext`] node, attached under the context
//! of the view whose container mounted it. The application owns the single
//! root node. A node exposes the route snapshot its view sees (`page`) and
//! whether the view is still live (`active`); both are observable.
//!
//! Page events (`pageenter`, `pageleave`, `pageerror`) are dispatched on the
//! node of the view concerned and bubble up to the root.

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use vista_core::reactive::{Emitter, Signal, Subscription};
use vista_router::{QueryParams, RouteState};

use crate::container::{ContainerPhase, ViewContainer};
use crate::dom::Element;
use crate::error::ViewError;
use crate::registry::ViewHandle;

/// Route snapshot seen by a mounted view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
	/// Full path, including query and hash.
	pub path: String,
	/// Decoded route parameters.
	pub route: RouteState,
	/// Query parameters.
	pub query: QueryParams,
}

/// Kind of a page event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEventKind {
	/// The view's page was committed to the tree.
	PageEnter,
	/// The view is about to be removed.
	PageLeave,
	/// Loading or rendering the view failed and no error view contained it.
	PageError(ViewError),
}

/// A page event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEvent {
	/// The view the event originated from.
	pub view: ViewHandle,
	/// What happened.
	pub kind: ViewEventKind,
}

struct ContextInner {
	view: Option<ViewHandle>,
	parent: Option<Weak<ContextInner>>,
	children: RefCell<Vec<ViewContext>>,
	page: Signal<PageState>,
	active: Signal<bool>,
	frozen: Cell<bool>,
	entered: Cell<bool>,
	on_enter: RefCell<Vec<Box<dyn FnOnce()>>>,
	container: OnceCell<Element>,
	events: Emitter<ViewEvent>,
	retained: RefCell<Vec<Subscription>>,
	disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
	containers: RefCell<Vec<ViewContainer>>,
}

/// Handle to a node of the view context tree.
#[derive(Clone)]
pub struct ViewContext {
	inner: Rc<ContextInner>,
}

/// Non-owning handle to a [`ViewContext`].
#[derive(Clone)]
pub struct WeakViewContext {
	inner: Weak<ContextInner>,
}

impl WeakViewContext {
	/// Upgrades to a strong handle if the node is alive.
	pub fn upgrade(&self) -> Option<ViewContext> {
		self.inner.upgrade().map(|inner| ViewContext { inner })
	}
}

impl ViewContext {
	fn build(view: Option<ViewHandle>, parent: Option<Weak<ContextInner>>, page: PageState) -> Self {
		Self {
			inner: Rc::new(ContextInner {
				view,
				parent,
				children: RefCell::new(Vec::new()),
				page: Signal::new(page),
				active: Signal::new(true),
				frozen: Cell::new(false),
				entered: Cell::new(false),
				on_enter: RefCell::new(Vec::new()),
				container: OnceCell::new(),
				events: Emitter::new(),
				retained: RefCell::new(Vec::new()),
				disposers: RefCell::new(Vec::new()),
				containers: RefCell::new(Vec::new()),
			}),
		}
	}

	pub(crate) fn root(page: PageState) -> Self {
		Self::build(None, None, page)
	}

	/// Creates a node for `view` and attaches it under `parent`.
	pub(crate) fn attach(view: ViewHandle, parent: &ViewContext, page: PageState) -> Self {
		let child = Self::build(Some(view), Some(Rc::downgrade(&parent.inner)), page);
		parent.inner.children.borrow_mut().push(child.clone());
		child
	}

	/// The mounted view; `None` for the root.
	pub fn view(&self) -> Option<ViewHandle> {
		self.inner.view
	}

	/// Whether this is the application root.
	pub fn is_root(&self) -> bool {
		self.inner.parent.is_none()
	}

	/// The parent node. `None` for the root or once the parent is gone.
	pub fn parent(&self) -> Option<ViewContext> {
		self.inner
			.parent
			.as_ref()
			.and_then(Weak::upgrade)
			.map(|inner| ViewContext { inner })
	}

	/// Snapshot of the attached child nodes.
	pub fn children(&self) -> Vec<ViewContext> {
		self.inner.children.borrow().clone()
	}

	/// Number of ancestors.
	pub fn depth(&self) -> usize {
		let mut depth = 0;
		let mut node = self.parent();
		while let Some(current) = node {
			depth += 1;
			node = current.parent();
		}
		depth
	}

	/// Route snapshot of the view.
	pub fn page(&self) -> Signal<PageState> {
		self.inner.page.clone()
	}

	/// Whether the view is still mounted.
	pub fn active(&self) -> Signal<bool> {
		self.inner.active.clone()
	}

	/// Current value of [`ViewContext::active`].
	pub fn is_active(&self) -> bool {
		self.inner.active.get()
	}

	/// Whether route changes should reach this node: it and all its ancestors
	/// are active and none is waiting for a replacement view to load.
	pub fn is_live(&self) -> bool {
		let mut node = Some(self.clone());
		while let Some(current) = node {
			if !current.is_active() || current.inner.frozen.get() {
				return false;
			}
			node = current.parent();
		}
		true
	}

	/// Whether the view's page is connected to the application's mount
	/// element. For the root, whether the application has finished mounting.
	pub fn is_entered(&self) -> bool {
		self.inner.entered.get()
	}

	/// Element holding the view's rendered page, set once after the first
	/// render.
	pub fn container(&self) -> Option<Element> {
		self.inner.container.get().cloned()
	}

	/// Phase and mounted view of each container rendered by this view.
	pub fn container_states(&self) -> Vec<(ContainerPhase, Option<ViewHandle>)> {
		self.inner
			.containers
			.borrow()
			.iter()
			.map(|c| (c.phase(), c.current_view()))
			.collect()
	}

	/// Subscribes to page events of this node and its descendants.
	#[must_use = "dropping the subscription unsubscribes the listener"]
	pub fn on_event<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&ViewEvent) + 'static,
	{
		self.inner.events.subscribe(listener)
	}

	/// Keeps `subscription` alive until the view is deactivated.
	pub fn retain(&self, subscription: Subscription) {
		if self.is_active() {
			self.inner.retained.borrow_mut().push(subscription);
		}
	}

	/// Runs `dispose` once the view's page is torn down.
	pub fn on_dispose<F>(&self, dispose: F)
	where
		F: FnOnce() + 'static,
	{
		self.inner.disposers.borrow_mut().push(Box::new(dispose));
	}

	/// Returns a non-owning handle.
	pub fn downgrade(&self) -> WeakViewContext {
		WeakViewContext {
			inner: Rc::downgrade(&self.inner),
		}
	}

	/// Returns whether both handles refer to the same node.
	pub fn ptr_eq(&self, other: &ViewContext) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	pub(crate) fn attach_container(&self, element: Element) {
		if self.inner.container.set(element).is_err() {
			tracing::debug!("view context container already set");
		}
	}

	pub(crate) fn add_container(&self, container: ViewContainer) {
		self.inner.containers.borrow_mut().push(container);
	}

	pub(crate) fn set_page(&self, page: PageState) {
		self.inner.page.set_if_changed(page);
	}

	pub(crate) fn set_frozen(&self, frozen: bool) {
		self.inner.frozen.set(frozen);
	}

	/// Runs `f` now if the node has entered, otherwise once it does.
	pub(crate) fn when_entered<F>(&self, f: F)
	where
		F: FnOnce() + 'static,
	{
		if self.is_entered() {
			f();
		} else {
			self.inner.on_enter.borrow_mut().push(Box::new(f));
		}
	}

	/// Updates the entered flag, flushing queued callbacks in order when set.
	pub(crate) fn set_entered(&self, entered: bool) {
		self.inner.entered.set(entered);
		if !entered {
			return;
		}
		let queued = std::mem::take(&mut *self.inner.on_enter.borrow_mut());
		for f in queued {
			f();
		}
	}

	/// Dispatches `kind` on this node and every ancestor.
	pub(crate) fn emit(&self, kind: ViewEventKind) {
		let Some(view) = self.inner.view else {
			return;
		};
		let event = ViewEvent { view, kind };
		let mut node = Some(self.clone());
		while let Some(current) = node {
			current.inner.events.emit(&event);
			node = current.parent();
		}
	}

	/// Marks this subtree inactive and drops retained subscriptions.
	pub(crate) fn deactivate(&self) {
		if !self.is_active() {
			return;
		}
		let retained = std::mem::take(&mut *self.inner.retained.borrow_mut());
		drop(retained);
		self.inner.active.set(false);
		for child in self.children() {
			child.deactivate();
		}
	}

	/// Removes this node from its parent's child list.
	pub(crate) fn detach(&self) {
		if let Some(parent) = self.parent() {
			parent
				.inner
				.children
				.borrow_mut()
				.retain(|c| !c.ptr_eq(self));
		}
	}

	/// Disposes nested containers and runs dispose callbacks.
	pub(crate) fn dispose(&self) {
		let containers = std::mem::take(&mut *self.inner.containers.borrow_mut());
		for container in containers {
			container.dispose();
		}
		let disposers = std::mem::take(&mut *self.inner.disposers.borrow_mut());
		for dispose in disposers {
			dispose();
		}
	}
}

impl fmt::Debug for ViewContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ViewContext")
			.field("view", &self.inner.view)
			.field("active", &self.is_active())
			.field("frozen", &self.inner.frozen.get())
			.field("entered", &self.is_entered())
			.field("children", &self.inner.children.borrow().len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registry::{Loader, ViewRegistry};
	use rstest::rstest;
	use vista_router::ParamMatchers;

	fn handles(n: usize) -> Vec<ViewHandle> {
		let registry = ViewRegistry::new();
		(0..n)
			.map(|_| registry.register(Loader::sync(|_| Ok(crate::Markup::Empty)), ParamMatchers::new()))
			.collect()
	}

	#[rstest]
	fn test_attach_and_detach() {
		let views = handles(1);
		let root = ViewContext::root(PageState::default());
		let child = ViewContext::attach(views[0], &root, PageState::default());

		assert_eq!(root.children().len(), 1);
		assert!(child.parent().unwrap().ptr_eq(&root));
		assert_eq!(child.depth(), 1);

		child.detach();
		assert!(root.children().is_empty());
	}

	#[rstest]
	fn test_deactivate_is_recursive() {
		let views = handles(2);
		let root = ViewContext::root(PageState::default());
		let outer = ViewContext::attach(views[0], &root, PageState::default());
		let inner = ViewContext::attach(views[1], &outer, PageState::default());

		outer.deactivate();
		assert!(!outer.is_active());
		assert!(!inner.is_active());
		assert!(root.is_active());
	}

	#[rstest]
	fn test_frozen_ancestor_blocks_liveness() {
		let views = handles(2);
		let root = ViewContext::root(PageState::default());
		let outer = ViewContext::attach(views[0], &root, PageState::default());
		let inner = ViewContext::attach(views[1], &outer, PageState::default());

		outer.set_frozen(true);
		assert!(inner.is_active());
		assert!(!inner.is_live());

		outer.set_frozen(false);
		assert!(inner.is_live());
	}

	#[rstest]
	fn test_events_bubble_to_root() {
		let views = handles(2);
		let root = ViewContext::root(PageState::default());
		let outer = ViewContext::attach(views[0], &root, PageState::default());
		let inner = ViewContext::attach(views[1], &outer, PageState::default());

		let seen = Rc::new(RefCell::new(Vec::new()));
		let s1 = Rc::clone(&seen);
		let _root_sub = root.on_event(move |e| s1.borrow_mut().push(("root", e.view)));
		let s2 = Rc::clone(&seen);
		let _outer_sub = outer.on_event(move |e| s2.borrow_mut().push(("outer", e.view)));

		inner.emit(ViewEventKind::PageEnter);
		assert_eq!(
			*seen.borrow(),
			vec![("outer", views[1]), ("root", views[1])]
		);
	}

	#[rstest]
	fn test_enter_callbacks_wait_for_parent() {
		let views = handles(1);
		let root = ViewContext::root(PageState::default());
		let child = ViewContext::attach(views[0], &root, PageState::default());
		let order = Rc::new(RefCell::new(Vec::new()));

		let log = Rc::clone(&order);
		let entering = child.clone();
		root.when_entered(move || {
			log.borrow_mut().push("child");
			entering.set_entered(true);
		});
		let log = Rc::clone(&order);
		child.when_entered(move || log.borrow_mut().push("grandchild"));
		assert!(order.borrow().is_empty());

		root.set_entered(true);
		assert_eq!(*order.borrow(), vec!["child", "grandchild"]);

		let log = Rc::clone(&order);
		child.when_entered(move || log.borrow_mut().push("late"));
		assert_eq!(order.borrow().last(), Some(&"late"));
	}

	#[rstest]
	fn test_retained_subscriptions_drop_on_deactivate() {
		let views = handles(1);
		let root = ViewContext::root(PageState::default());
		let child = ViewContext::attach(views[0], &root, PageState::default());
		let emitter: Emitter<()> = Emitter::new();

		child.retain(emitter.subscribe(|_| {}));
		assert_eq!(emitter.listener_count(), 1);

		child.deactivate();
		assert_eq!(emitter.listener_count(), 0);
	}
}
