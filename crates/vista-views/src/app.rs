//! Application surface.
//!
//! An [`App`] ties a [`ViewRegistry`], a [`Router`] and the scheduling and
//! animation collaborators together. Application code talks to it through a
//! [`Navigator`], and components receive a [`ViewScope`] when rendered.

use std::fmt;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawn;
use serde_json::Value;
use vista_core::Spawner;
use vista_core::reactive::Subscription;
use vista_history::{EntryKey, History};
use vista_router::{
	NavigateOptions, NavigateResult, NavigationType, ParamMatchers, Router,
};

use crate::animate::{Animator, NoopAnimator};
use crate::config::AppConfig;
use crate::container::render_markup;
use crate::context::{PageState, ViewContext};
use crate::dom::Element;
use crate::error::ViewError;
use crate::markup::{IntoMarkup, Markup, RenderView};
use crate::registry::{Loader, ViewHandle, ViewRegistry};
use crate::resolve::{LinkTarget, resolve_path};

pub(crate) struct AppShared {
	pub(crate) registry: ViewRegistry,
	pub(crate) router: Router,
	pub(crate) spawner: Spawner,
	pub(crate) animator: Rc<dyn Animator>,
	pub(crate) config: AppConfig,
}

impl AppShared {
	pub(crate) fn page_state(&self) -> PageState {
		PageState {
			path: self.router.path(),
			route: self.router.route(),
			query: self.router.query(),
		}
	}
}

/// Handle for navigation and view queries.
///
/// Cheap to clone; every clone talks to the same application.
#[derive(Clone)]
pub struct Navigator {
	shared: Rc<AppShared>,
}

impl Navigator {
	/// Registers a view selected by `matchers`.
	pub fn register_view(&self, loader: Loader, matchers: ParamMatchers) -> ViewHandle {
		self.shared.registry.register(loader, matchers)
	}

	/// Sets the view rendered in place of contained load and render errors.
	pub fn register_error_view<F>(&self, render: F)
	where
		F: Fn(&ViewError) -> Markup + 'static,
	{
		self.shared.registry.register_error_view(render);
	}

	/// Markup for a container choosing among `views`.
	///
	/// # Errors
	///
	/// Returns [`ViewError::InvalidArgument`] if a view is not registered with
	/// this application.
	pub fn render_view(&self, props: Value, views: &[ViewHandle]) -> Result<RenderView, ViewError> {
		if let Some(view) = views
			.iter()
			.find(|view| !self.shared.registry.is_registered(**view))
		{
			return Err(ViewError::InvalidArgument(format!(
				"{} is not registered with this application",
				view
			)));
		}
		Ok(RenderView {
			views: views.to_vec(),
			default_view: None,
			props: Rc::new(props),
		})
	}

	/// Whether `view` matches the current route at its canonical path.
	///
	/// The canonical path is resolved without overrides, so optional
	/// parameters the view can do without must be absent. Containers resolve
	/// with the current route as override instead: with `/{view}/{baz?}`, a
	/// view matching only `view = "foo"` stays mounted at `/foo/x` while this
	/// returns `false` there.
	pub fn is_view_matched(&self, view: ViewHandle) -> bool {
		self.shared.registry.matches(view, &self.shared.router.route())
			&& self.link_to(view, None) == self.shared.router.pathname()
	}

	/// Whether `view` is mounted anywhere.
	pub fn is_view_rendered(&self, view: ViewHandle) -> bool {
		self.shared
			.registry
			.get(view)
			.is_some_and(|r| r.mount_count() > 0)
	}

	/// The most specific of `views` matching the current route.
	pub fn match_view(&self, views: &[ViewHandle]) -> Option<ViewHandle> {
		self.shared
			.registry
			.best_match(views, &self.shared.router.route())
	}

	/// The most specific of `views` matching `path`.
	pub fn match_view_at(&self, path: &str, views: &[ViewHandle]) -> Option<ViewHandle> {
		let route = self.shared.router.match_path(path)?;
		self.shared.registry.best_match(views, &route)
	}

	/// The most specific registered view matching the current route.
	pub fn best_view(&self) -> Option<ViewHandle> {
		self.shared.registry.best_view(&self.shared.router.route())
	}

	/// Canonical path of `view`, optionally with overrides.
	pub fn link_to(&self, view: ViewHandle, target: Option<&LinkTarget>) -> String {
		resolve_path(&self.shared.registry, &self.shared.router, view, target)
	}

	/// Pushes the canonical path of `view`.
	pub fn navigate_to(
		&self,
		view: ViewHandle,
		target: Option<&LinkTarget>,
		data: Option<Value>,
	) -> LocalBoxFuture<'static, NavigateResult> {
		let path = self.link_to(view, target);
		self.navigate(&path, NavigateOptions { replace: false, data })
	}

	/// Replaces the current entry with the canonical path of `view`.
	pub fn redirect_to(
		&self,
		view: ViewHandle,
		target: Option<&LinkTarget>,
		data: Option<Value>,
	) -> LocalBoxFuture<'static, NavigateResult> {
		let path = self.link_to(view, target);
		self.navigate(&path, NavigateOptions { replace: true, data })
	}

	/// Navigates to `path`.
	pub fn navigate(&self, path: &str, options: NavigateOptions) -> LocalBoxFuture<'static, NavigateResult> {
		tracing::info!(path, replace = options.replace, "navigation requested");
		self.shared.router.navigate(path, options)
	}

	/// Goes one entry back.
	pub fn back(&self) -> LocalBoxFuture<'static, Option<NavigateResult>> {
		self.shared.router.back()
	}

	/// Goes one entry forward.
	pub fn forward(&self) -> LocalBoxFuture<'static, Option<NavigateResult>> {
		self.shared.router.forward()
	}

	/// Clones the current history entry forward.
	pub fn snapshot(&self) -> EntryKey {
		self.shared.router.history().snapshot()
	}

	/// The router.
	pub fn router(&self) -> &Router {
		&self.shared.router
	}

	/// The session history.
	pub fn history(&self) -> &History {
		self.shared.router.history()
	}

	/// The view registry.
	pub fn registry(&self) -> &ViewRegistry {
		&self.shared.registry
	}

	/// The task spawner.
	pub fn spawner(&self) -> &Spawner {
		&self.shared.spawner
	}
}

impl fmt::Debug for Navigator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Navigator")
			.field("router", &self.shared.router)
			.field("registry", &self.shared.registry)
			.finish()
	}
}

/// What a component sees while rendering.
#[derive(Clone)]
pub struct ViewScope {
	pub(crate) navigator: Navigator,
	context: ViewContext,
	props: Rc<Value>,
}

impl ViewScope {
	pub(crate) fn new(shared: Rc<AppShared>, context: ViewContext, props: Rc<Value>) -> Self {
		Self {
			navigator: Navigator { shared },
			context,
			props,
		}
	}

	pub(crate) fn shared(&self) -> &Rc<AppShared> {
		&self.navigator.shared
	}

	/// The application's navigator.
	pub fn navigator(&self) -> &Navigator {
		&self.navigator
	}

	/// Context node of the view being rendered.
	pub fn context(&self) -> &ViewContext {
		&self.context
	}

	/// Props passed to the container.
	pub fn props(&self) -> &Value {
		&self.props
	}

	/// The router.
	pub fn router(&self) -> &Router {
		self.navigator.router()
	}

	/// The session history.
	pub fn history(&self) -> &History {
		self.navigator.history()
	}
}

impl fmt::Debug for ViewScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ViewScope")
			.field("context", &self.context)
			.field("props", &self.props)
			.finish()
	}
}

/// A routed application.
pub struct App {
	navigator: Navigator,
	root: ViewContext,
	_root_page: Subscription,
}

impl App {
	/// Starts building an application.
	pub fn builder() -> AppBuilder {
		AppBuilder::new()
	}

	/// The application's navigator.
	pub fn navigator(&self) -> &Navigator {
		&self.navigator
	}

	/// Root of the view context tree.
	pub fn root_context(&self) -> &ViewContext {
		&self.root
	}

	/// Renders `markup` into `element` as the application root.
	///
	/// Resolves once every view container in the markup has settled its
	/// first mount.
	pub fn mount(&self, element: &Element, markup: impl IntoMarkup) -> LocalBoxFuture<'static, ()> {
		let shared = Rc::clone(&self.navigator.shared);
		let token = shared.router.begin_navigation(NavigationType::Initial);
		tracing::info!(path = %shared.router.path(), "mounting application");

		let scope = ViewScope::new(shared, self.root.clone(), Rc::new(Value::Null));
		self.root.set_entered(false);
		render_markup(markup.into_markup(), element, &scope);
		self.root.set_entered(true);
		token.settled().boxed_local()
	}
}

impl fmt::Debug for App {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("App")
			.field("navigator", &self.navigator)
			.field("root", &self.root)
			.finish()
	}
}

/// Builder for [`App`].
pub struct AppBuilder {
	config: AppConfig,
	spawner: Option<Spawner>,
	animator: Rc<dyn Animator>,
	history: Option<History>,
}

impl AppBuilder {
	/// A builder with default configuration and no transitions.
	pub fn new() -> Self {
		Self {
			config: AppConfig::default(),
			spawner: None,
			animator: Rc::new(NoopAnimator),
			history: None,
		}
	}

	/// Replaces the whole configuration.
	pub fn config(mut self, config: AppConfig) -> Self {
		self.config = config;
		self
	}

	/// Replaces the route table.
	pub fn routes<I, S>(mut self, routes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.config.routes = routes.into_iter().map(Into::into).collect();
		self
	}

	/// Sets the initial path. Ignored when a history is supplied.
	pub fn initial_path(mut self, path: impl Into<String>) -> Self {
		self.config.initial_path = path.into();
		self
	}

	/// Sets the trigger name passed to the animator.
	pub fn transition_trigger(mut self, trigger: impl Into<String>) -> Self {
		self.config.transition_trigger = trigger.into();
		self
	}

	/// Sets how many consecutive canonical-path redirects are honoured.
	pub fn max_redirects(mut self, max: usize) -> Self {
		self.config.max_redirects = max;
		self
	}

	/// Sets the scheduler for loaders, redirects and exit transitions.
	pub fn spawner<S>(mut self, spawner: S) -> Self
	where
		S: LocalSpawn + 'static,
	{
		self.spawner = Some(Spawner::new(spawner));
		self
	}

	/// Sets the transition animator.
	pub fn animator<A>(mut self, animator: A) -> Self
	where
		A: Animator + 'static,
	{
		self.animator = Rc::new(animator);
		self
	}

	/// Uses an existing history instead of a fresh one.
	pub fn history(mut self, history: History) -> Self {
		self.history = Some(history);
		self
	}

	/// Builds the application.
	///
	/// # Errors
	///
	/// Returns [`ViewError::InvalidArgument`] without a spawner and
	/// [`ViewError::Router`] for an invalid route pattern.
	pub fn build(self) -> Result<App, ViewError> {
		let spawner = self
			.spawner
			.ok_or_else(|| ViewError::InvalidArgument("an application needs a spawner".to_string()))?;
		let history = self
			.history
			.unwrap_or_else(|| History::new(self.config.initial_path.clone()));
		let router = Router::new(&self.config.routes, history)?;

		let shared = Rc::new(AppShared {
			registry: ViewRegistry::new(),
			router,
			spawner,
			animator: self.animator,
			config: self.config,
		});
		let root = ViewContext::root(shared.page_state());

		let weak_root = root.downgrade();
		let reader = Rc::downgrade(&shared);
		let root_page = shared.router.on_change(move |_| {
			if let (Some(root), Some(shared)) = (weak_root.upgrade(), reader.upgrade()) {
				root.set_page(shared.page_state());
			}
		});
		tracing::debug!(routes = shared.config.routes.len(), "application built");

		Ok(App {
			navigator: Navigator { shared },
			root,
			_root_page: root_page,
		})
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}
