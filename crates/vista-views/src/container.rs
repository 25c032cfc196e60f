//! View containers.
//!
//! A container is the mount point created for each [`Markup::Views`]. On every
//! route change it picks the best matching view among its candidates and
//! reconciles:
//!
//! 1. No match: the mounted view leaves and the container is empty.
//! 2. Same view as mounted: only the page snapshot is refreshed.
//! 3. Different view: the view's canonical path is checked first. If it
//!    disagrees with the current path a replace navigation is issued and the
//!    update stops there. Otherwise a pending mount starts.
//!
//! `pageenter` and the entrance transition run only once the page element is
//! connected, after the enclosing view's own `pageenter`.
//!
//! Each pending mount carries a generation number. Loader results for an
//! older generation are dropped. Every pending mount, redirect and exit
//! transition registers a wait on the navigation in flight, so awaiting a
//! navigation covers the whole view tree.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::channel::oneshot;
use vista_core::reactive::Subscription;
use vista_router::{NavigateOptions, split_path};

use crate::app::{AppShared, ViewScope};
use crate::context::{ViewContext, ViewEventKind, WeakViewContext};
use crate::dom::Element;
use crate::error::ViewError;
use crate::markup::{Markup, RenderView};
use crate::registry::{Component, Loader, ViewHandle};
use crate::resolve::{LinkTarget, resolve_path};

/// Tag of the element wrapping a container.
pub const CONTAINER_TAG: &str = "vista-view";

/// Tag of the element wrapping a mounted page.
pub const PAGE_TAG: &str = "vista-page";

/// Attribute carrying the mounted view's id on a page element.
pub const VIEW_ATTR: &str = "data-view";

/// Reconciliation state of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerPhase {
	/// No view matches.
	Unmatched,
	/// A view's component is being loaded.
	Loading,
	/// A view is mounted.
	Mounted,
	/// The last view is running its exit transition.
	Unmounting,
}

struct Mounted {
	view: ViewHandle,
	context: ViewContext,
	element: Element,
}

struct Pending {
	view: ViewHandle,
	// Dropping the sender resolves the navigation wait as well.
	settle: oneshot::Sender<()>,
}

struct ContainerState {
	phase: ContainerPhase,
	current: Option<Mounted>,
	pending: Option<Pending>,
	redirects: usize,
}

struct ContainerInner {
	shared: Rc<AppShared>,
	parent: WeakViewContext,
	render: RenderView,
	root: Element,
	state: RefCell<ContainerState>,
	generation: Cell<u64>,
	subscription: RefCell<Option<Subscription>>,
	disposed: Cell<bool>,
}

/// A view container.
#[derive(Clone)]
pub(crate) struct ViewContainer {
	inner: Rc<ContainerInner>,
}

impl ViewContainer {
	fn new(shared: Rc<AppShared>, parent: &ViewContext, render: RenderView, root: Element) -> Self {
		let inner = Rc::new(ContainerInner {
			shared,
			parent: parent.downgrade(),
			render,
			root,
			state: RefCell::new(ContainerState {
				phase: ContainerPhase::Unmatched,
				current: None,
				pending: None,
				redirects: 0,
			}),
			generation: Cell::new(0),
			subscription: RefCell::new(None),
			disposed: Cell::new(false),
		});

		let weak: Weak<ContainerInner> = Rc::downgrade(&inner);
		let subscription = inner.shared.router.on_change(move |_| {
			if let Some(inner) = weak.upgrade() {
				inner.evaluate();
			}
		});
		*inner.subscription.borrow_mut() = Some(subscription);
		Self { inner }
	}

	pub(crate) fn phase(&self) -> ContainerPhase {
		self.inner.state.borrow().phase
	}

	pub(crate) fn current_view(&self) -> Option<ViewHandle> {
		self.inner.state.borrow().current.as_ref().map(|m| m.view)
	}

	/// Tears the container down without exit transitions.
	pub(crate) fn dispose(&self) {
		let inner = &self.inner;
		if inner.disposed.replace(true) {
			return;
		}
		inner.subscription.borrow_mut().take();
		inner.generation.set(inner.generation.get() + 1);

		let (pending, current) = {
			let mut state = inner.state.borrow_mut();
			state.phase = ContainerPhase::Unmatched;
			(state.pending.take(), state.current.take())
		};
		drop(pending);
		if let Some(Mounted {
			view,
			context,
			element,
		}) = current
		{
			tracing::debug!(%view, "disposing mounted view");
			context.deactivate();
			context.detach();
			element.remove();
			context.dispose();
			inner.shared.registry.unmounted(view);
		}
	}
}

impl fmt::Debug for ViewContainer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ViewContainer")
			.field("phase", &self.phase())
			.field("current", &self.current_view())
			.field("generation", &self.inner.generation.get())
			.finish()
	}
}

impl ContainerInner {
	fn evaluate(self: &Rc<Self>) {
		if self.disposed.get() {
			return;
		}
		let Some(parent) = self.parent.upgrade() else {
			return;
		};
		if !parent.is_live() {
			tracing::debug!("container parent is not live; skipping");
			return;
		}

		let router = &self.shared.router;
		let route = router.route();
		let matched = self
			.shared
			.registry
			.best_match(&self.render.views, &route)
			.or(self.render.default_view);

		let Some(view) = matched else {
			self.cancel_pending();
			self.leave_current();
			let mut state = self.state.borrow_mut();
			if state.phase != ContainerPhase::Unmounting {
				state.phase = ContainerPhase::Unmatched;
			}
			return;
		};

		let (current, pending) = {
			let state = self.state.borrow();
			(
				state
					.current
					.as_ref()
					.map(|m| (m.view, m.context.clone())),
				state.pending.as_ref().map(|p| p.view),
			)
		};
		if let Some((current_view, context)) = current {
			if current_view == view {
				self.cancel_pending();
				self.state.borrow_mut().redirects = 0;
				context.set_frozen(false);
				context.set_page(self.shared.page_state());
				return;
			}
		}
		if pending == Some(view) {
			return;
		}

		let canonical = resolve_path(
			&self.shared.registry,
			router,
			view,
			Some(&LinkTarget::params(route)),
		);
		let pathname = router.pathname();
		if canonical != pathname {
			let attempt = {
				let mut state = self.state.borrow_mut();
				state.redirects += 1;
				state.redirects
			};
			if attempt <= self.shared.config.max_redirects {
				self.redirect(view, canonical);
				return;
			}
			tracing::warn!(
				%view,
				%canonical,
				%pathname,
				"redirect limit reached; mounting at non-canonical path"
			);
		}
		self.state.borrow_mut().redirects = 0;
		self.begin_mount(view);
	}

	fn redirect(&self, view: ViewHandle, canonical: String) {
		let router = self.shared.router.clone();
		let current = router.path();
		let (_, query, hash) = split_path(&current);
		let mut target = canonical;
		if !query.is_empty() {
			target.push('?');
			target.push_str(query);
		}
		if !hash.is_empty() {
			target.push('#');
			target.push_str(hash);
		}
		tracing::info!(%view, from = %current, to = %target, "redirecting to canonical path");

		let (done, finished) = oneshot::channel::<()>();
		router.wait_for(async move {
			let _ = finished.await;
		});
		self.shared.spawner.spawn(async move {
			router.navigate(&target, NavigateOptions::replace()).await;
			let _ = done.send(());
		});
	}

	fn begin_mount(self: &Rc<Self>, view: ViewHandle) {
		let Some(registration) = self.shared.registry.get(view) else {
			tracing::warn!(%view, "cannot mount unregistered view");
			return;
		};
		let generation = self.generation.get() + 1;
		self.generation.set(generation);

		let (settle, settled) = oneshot::channel::<()>();
		self.shared.router.wait_for(async move {
			let _ = settled.await;
		});
		let (superseded, mounted) = {
			let mut state = self.state.borrow_mut();
			state.phase = ContainerPhase::Loading;
			let superseded = state.pending.replace(Pending { view, settle });
			let mounted = state.current.as_ref().map(|m| m.context.clone());
			(superseded, mounted)
		};
		if let Some(superseded) = superseded {
			tracing::debug!(view = %superseded.view, "pending mount superseded");
		}
		if let Some(context) = mounted {
			context.set_frozen(true);
		}
		tracing::debug!(%view, generation, "mount started");

		match registration.loader().clone() {
			Loader::Sync(component) => self.commit(generation, Ok(component)),
			Loader::Async(load) => {
				let loading = load();
				let weak = Rc::downgrade(self);
				self.shared.spawner.spawn(async move {
					let result = loading.await;
					if let Some(inner) = weak.upgrade() {
						inner.commit(generation, result);
					}
				});
			}
		}
	}

	fn cancel_pending(&self) {
		let pending = self.state.borrow_mut().pending.take();
		if let Some(pending) = pending {
			self.generation.set(self.generation.get() + 1);
			tracing::debug!(view = %pending.view, "pending mount cancelled");
		}
	}

	fn commit(self: &Rc<Self>, generation: u64, result: Result<Component, ViewError>) {
		if self.disposed.get() || self.generation.get() != generation {
			tracing::debug!(generation, "discarding superseded mount");
			return;
		}
		let Some(parent) = self.parent.upgrade() else {
			return;
		};
		let pending = self.state.borrow_mut().pending.take();
		let Some(pending) = pending else {
			return;
		};
		let view = pending.view;

		self.leave_current();

		let shared = &self.shared;
		let context = ViewContext::attach(view, &parent, shared.page_state());
		let element = Element::new(PAGE_TAG);
		element.set_attr(VIEW_ATTR, view.id().to_string());
		shared.registry.mounted(view);
		{
			let mut state = self.state.borrow_mut();
			state.current = Some(Mounted {
				view,
				context: context.clone(),
				element: element.clone(),
			});
			state.phase = ContainerPhase::Mounted;
		}

		let scope = ViewScope::new(Rc::clone(shared), context.clone(), Rc::clone(&self.render.props));
		match result.and_then(|component| component(&scope)) {
			Ok(markup) => render_markup(markup, &element, &scope),
			Err(error) => self.handle_error(&scope, &element, error),
		}
		self.root.append_child(&element);
		context.attach_container(element.clone());
		tracing::info!(%view, generation, "view mounted");

		// Nested pages commit while their parent is still detached.
		let animator = Rc::clone(&shared.animator);
		let trigger = shared.config.transition_trigger.clone();
		let entering = context.clone();
		parent.when_entered(move || {
			if entering.is_active() {
				entering.emit(ViewEventKind::PageEnter);
				animator.animate_in(&element, &trigger);
			}
			entering.set_entered(true);
		});
		let _ = pending.settle.send(());
	}

	fn handle_error(&self, scope: &ViewScope, element: &Element, error: ViewError) {
		let view = scope.context().view();
		if error.is_containable() {
			if let Some(error_view) = self.shared.registry.error_view() {
				tracing::warn!(?view, %error, "view error contained by error view");
				render_markup(error_view(&error), element, scope);
				return;
			}
		}
		tracing::error!(?view, %error, "view failed");
		scope.context().emit(ViewEventKind::PageError(error));
	}

	fn leave_current(self: &Rc<Self>) {
		let mounted = {
			let mut state = self.state.borrow_mut();
			let mounted = state.current.take();
			if mounted.is_some() && state.pending.is_none() {
				state.phase = ContainerPhase::Unmounting;
			}
			mounted
		};
		let Some(Mounted {
			view,
			context,
			element,
		}) = mounted
		else {
			return;
		};
		tracing::debug!(%view, "view leaving");

		context.emit(ViewEventKind::PageLeave);
		context.deactivate();
		context.detach();

		let shared = Rc::clone(&self.shared);
		let weak = Rc::downgrade(self);
		let page = element.clone();
		let finish = move || {
			page.remove();
			context.dispose();
			shared.registry.unmounted(view);
			if let Some(inner) = weak.upgrade() {
				let mut state = inner.state.borrow_mut();
				if state.phase == ContainerPhase::Unmounting {
					state.phase = ContainerPhase::Unmatched;
				}
			}
			tracing::debug!(%view, "view removed");
		};

		let mut outro = self
			.shared
			.animator
			.animate_out(&element, &self.shared.config.transition_trigger);
		if (&mut outro).now_or_never().is_some() {
			finish();
			return;
		}

		let (done, finished) = oneshot::channel::<()>();
		self.shared.router.wait_for(async move {
			let _ = finished.await;
		});
		self.shared.spawner.spawn(async move {
			outro.await;
			finish();
			let _ = done.send(());
		});
	}
}

/// Renders `markup` into `parent` on behalf of the view owning `scope`.
pub(crate) fn render_markup(markup: Markup, parent: &Element, scope: &ViewScope) {
	match markup {
		Markup::Empty => {}
		Markup::Text(text) => parent.append_child(&Element::text(text.into_owned())),
		Markup::Element(element) => {
			let (node, children) = element.into_parts();
			for child in children {
				render_markup(child, &node, scope);
			}
			parent.append_child(&node);
		}
		Markup::Fragment(children) => {
			for child in children {
				render_markup(child, parent, scope);
			}
		}
		Markup::Views(render) => {
			let root = Element::new(CONTAINER_TAG);
			parent.append_child(&root);
			let container = ViewContainer::new(Rc::clone(scope.shared()), scope.context(), render, root);
			scope.context().add_container(container.clone());
			container.inner.evaluate();
		}
		Markup::Portal { target, content } => {
			let wrapper = Element::new("vista-portal");
			render_markup(*content, &wrapper, scope);
			target.append_child(&wrapper);
			scope.context().on_dispose(move || wrapper.remove());
		}
	}
}
