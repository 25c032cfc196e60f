//! View registry.
//!
//! Each [`App`](crate::App) owns one registry. Registering a view stores its
//! loader and parameter matchers and returns a [`ViewHandle`]; handles from a
//! different registry are treated as unregistered.

use std::cell::{Cell, OnceCell, RefCell};
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use vista_router::{Matchable, Matcher, ParamMatchers, RouteState};

use crate::app::ViewScope;
use crate::error::ViewError;
use crate::markup::Markup;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// A renderable component.
pub type Component = Rc<dyn Fn(&ViewScope) -> Result<Markup, ViewError>>;

/// Renders the app-wide error view.
pub type ErrorView = Rc<dyn Fn(&ViewError) -> Markup>;

/// Wraps a closure as a [`Component`].
pub fn component<F>(render: F) -> Component
where
	F: Fn(&ViewScope) -> Result<Markup, ViewError> + 'static,
{
	Rc::new(render)
}

/// How a view's component is obtained.
#[derive(Clone)]
pub enum Loader {
	/// The component is available right away.
	Sync(Component),
	/// The component is resolved by a future.
	Async(Rc<dyn Fn() -> LocalBoxFuture<'static, Result<Component, ViewError>>>),
}

impl Loader {
	/// A loader for a component available right away.
	pub fn sync<F>(render: F) -> Self
	where
		F: Fn(&ViewScope) -> Result<Markup, ViewError> + 'static,
	{
		Self::Sync(Rc::new(render))
	}

	/// A loader resolving the component through `load`.
	///
	/// `load` runs every time the view is mounted.
	pub fn future<F, Fut>(load: F) -> Self
	where
		F: Fn() -> Fut + 'static,
		Fut: Future<Output = Result<Component, ViewError>> + 'static,
	{
		Self::Async(Rc::new(move || load().boxed_local()))
	}

	/// Whether the loader must be awaited.
	pub fn is_async(&self) -> bool {
		matches!(self, Self::Async(_))
	}
}

impl fmt::Debug for Loader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Sync(_) => f.write_str("Loader::Sync"),
			Self::Async(_) => f.write_str("Loader::Async"),
		}
	}
}

/// Opaque identity of a registered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewHandle {
	registry: u64,
	id: u64,
}

impl ViewHandle {
	/// Numeric id, unique within its registry.
	pub fn id(&self) -> u64 {
		self.id
	}
}

impl fmt::Display for ViewHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "view#{}", self.id)
	}
}

/// Parameter names a view's canonical path may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamBounds {
	/// Names an override may set.
	pub max: BTreeSet<String>,
	/// Names carried over from the current route.
	pub min: BTreeSet<String>,
}

/// Registration metadata of one view.
pub struct ViewRegistration {
	handle: ViewHandle,
	loader: Loader,
	matchers: ParamMatchers,
	constant_params: RouteState,
	mount_count: Cell<usize>,
	bounds: OnceCell<ParamBounds>,
}

impl ViewRegistration {
	/// The view's handle.
	pub fn handle(&self) -> ViewHandle {
		self.handle
	}

	/// The view's loader.
	pub fn loader(&self) -> &Loader {
		&self.loader
	}

	/// Parameters pinned to exact values.
	pub fn constant_params(&self) -> &RouteState {
		&self.constant_params
	}

	/// Number of live mounts.
	pub fn mount_count(&self) -> usize {
		self.mount_count.get()
	}

	/// Memoised parameter bounds, computed on first use.
	pub fn bounds<F>(&self, compute: F) -> &ParamBounds
	where
		F: FnOnce() -> ParamBounds,
	{
		self.bounds.get_or_init(compute)
	}
}

impl Matchable for ViewRegistration {
	fn matchers(&self) -> &ParamMatchers {
		&self.matchers
	}
}

impl fmt::Debug for ViewRegistration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ViewRegistration")
			.field("handle", &self.handle)
			.field("matchers", &self.matchers)
			.field("mount_count", &self.mount_count.get())
			.finish()
	}
}

/// Table of registered views.
pub struct ViewRegistry {
	id: u64,
	views: RefCell<Vec<Rc<ViewRegistration>>>,
	by_specificity: RefCell<Vec<Rc<ViewRegistration>>>,
	error_view: RefCell<Option<ErrorView>>,
}

impl ViewRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
			views: RefCell::new(Vec::new()),
			by_specificity: RefCell::new(Vec::new()),
			error_view: RefCell::new(None),
		}
	}

	/// Registers a view selected by `matchers`.
	pub fn register(&self, loader: Loader, matchers: ParamMatchers) -> ViewHandle {
		let handle = ViewHandle {
			registry: self.id,
			id: self.views.borrow().len() as u64 + 1,
		};
		let constant_params = matchers
			.iter()
			.filter_map(|(name, m)| m.exact_value().map(|v| (name.clone(), v.to_string())))
			.collect();
		let registration = Rc::new(ViewRegistration {
			handle,
			loader,
			matchers,
			constant_params,
			mount_count: Cell::new(0),
			bounds: OnceCell::new(),
		});
		tracing::debug!(
			%handle,
			specificity = registration.specificity(),
			loader = ?registration.loader,
			"view registered"
		);

		self.views.borrow_mut().push(Rc::clone(&registration));
		let mut sorted = self.by_specificity.borrow_mut();
		sorted.push(registration);
		sorted.sort_by_key(|r| std::cmp::Reverse(r.specificity()));
		handle
	}

	/// Sets the view rendered in place of contained load and render errors.
	pub fn register_error_view<F>(&self, render: F)
	where
		F: Fn(&ViewError) -> Markup + 'static,
	{
		*self.error_view.borrow_mut() = Some(Rc::new(render));
	}

	/// The registered error view.
	pub fn error_view(&self) -> Option<ErrorView> {
		self.error_view.borrow().clone()
	}

	/// Whether `handle` belongs to this registry.
	pub fn is_registered(&self, handle: ViewHandle) -> bool {
		self.get(handle).is_some()
	}

	/// Registration of `handle`.
	pub fn get(&self, handle: ViewHandle) -> Option<Rc<ViewRegistration>> {
		if handle.registry != self.id {
			return None;
		}
		let index = usize::try_from(handle.id).ok()?.checked_sub(1)?;
		self.views.borrow().get(index).cloned()
	}

	/// Number of registered views.
	pub fn len(&self) -> usize {
		self.views.borrow().len()
	}

	/// Whether no view is registered.
	pub fn is_empty(&self) -> bool {
		self.views.borrow().is_empty()
	}

	/// Whether `handle` is registered and matches `route`.
	pub fn matches(&self, handle: ViewHandle, route: &RouteState) -> bool {
		self.get(handle)
			.is_some_and(|r| vista_router::matches(&r.matchers, route))
	}

	/// Most specific of `candidates` matching `route`.
	///
	/// Ties go to the view registered first.
	pub fn best_match(&self, candidates: &[ViewHandle], route: &RouteState) -> Option<ViewHandle> {
		let views = self.views.borrow();
		let registered = views.iter().filter(|r| candidates.contains(&r.handle));
		vista_router::best_match(registered.map(Rc::as_ref), route).map(|r| r.handle)
	}

	/// Most specific registered view matching `route`.
	pub fn best_view(&self, route: &RouteState) -> Option<ViewHandle> {
		self.by_specificity
			.borrow()
			.iter()
			.find(|r| vista_router::matches(&r.matchers, route))
			.map(|r| r.handle)
	}

	/// Parameter names constrained by any registration.
	pub fn used_params(&self) -> BTreeSet<String> {
		self.views
			.borrow()
			.iter()
			.flat_map(|r| r.matchers.keys().cloned())
			.collect()
	}

	pub(crate) fn mounted(&self, handle: ViewHandle) {
		if let Some(r) = self.get(handle) {
			r.mount_count.set(r.mount_count.get() + 1);
		}
	}

	pub(crate) fn unmounted(&self, handle: ViewHandle) {
		if let Some(r) = self.get(handle) {
			r.mount_count.set(r.mount_count.get().saturating_sub(1));
		}
	}
}

impl Default for ViewRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for ViewRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ViewRegistry")
			.field("id", &self.id)
			.field("views", &self.len())
			.field("has_error_view", &self.error_view.borrow().is_some())
			.finish()
	}
}

/// Convenience for `(name, matcher)` pairs accepted by
/// [`ViewRegistry::register`].
pub fn params<I, K, M>(pairs: I) -> ParamMatchers
where
	I: IntoIterator<Item = (K, M)>,
	K: Into<String>,
	M: Into<Matcher>,
{
	vista_router::param_matchers(pairs)
}
