//! History-backed router.
//!
//! The router owns the route table and the session [`History`]. Navigating
//! updates the history, re-matches the path and publishes the result through
//! three signals (full path, decoded route, query) plus a change emitter that
//! view containers listen to.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use vista_core::reactive::{Emitter, Signal, Subscription};
use vista_history::History;

use crate::error::RouterError;
use crate::navigation::{
	NavigateOptions, NavigateResult, NavigationToken, NavigationType, PageLoadEvent,
};
use crate::pattern::RouteInfo;
use crate::route_state::{QueryParams, RouteState, split_path};

struct RouterInner {
	routes: Vec<RouteInfo>,
	history: History,
	path: Signal<String>,
	route: Signal<RouteState>,
	query: Signal<QueryParams>,
	changed: Emitter<NavigationToken>,
	before_page_load: Emitter<PageLoadEvent>,
	navigation: RefCell<Option<NavigationToken>>,
	next_navigation: Cell<u64>,
}

/// Client-side router.
///
/// Cloning yields another handle to the same router.
#[derive(Clone)]
pub struct Router {
	inner: Rc<RouterInner>,
}

impl Router {
	/// Creates a router over `routes`, starting at the history's current entry.
	///
	/// Routes are tried in order; the first match wins.
	pub fn new<I, S>(routes: I, history: History) -> Result<Self, RouterError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let routes = routes
			.into_iter()
			.map(|r| RouteInfo::parse(r.as_ref()))
			.collect::<Result<Vec<_>, _>>()?;
		tracing::debug!(count = routes.len(), "route table compiled");

		let initial = history.current().path().to_string();
		let router = Self {
			inner: Rc::new(RouterInner {
				routes,
				history,
				path: Signal::new(String::new()),
				route: Signal::new(RouteState::new()),
				query: Signal::new(QueryParams::new()),
				changed: Emitter::new(),
				before_page_load: Emitter::new(),
				navigation: RefCell::new(None),
				next_navigation: Cell::new(0),
			}),
		};
		router.apply(&initial);
		Ok(router)
	}

	/// Parses a route pattern without adding it to the table.
	pub fn parse_route(pattern: &str) -> Result<RouteInfo, RouterError> {
		RouteInfo::parse(pattern)
	}

	/// The route table.
	pub fn routes(&self) -> &[RouteInfo] {
		&self.inner.routes
	}

	/// The session history.
	pub fn history(&self) -> &History {
		&self.inner.history
	}

	/// Current full path, including query and hash.
	pub fn path(&self) -> String {
		self.inner.path.get()
	}

	/// Current path without query and hash.
	pub fn pathname(&self) -> String {
		self.inner
			.path
			.with(|path| split_path(path).0.to_string())
	}

	/// Current decoded route parameters.
	pub fn route(&self) -> RouteState {
		self.inner.route.get()
	}

	/// Current query parameters.
	pub fn query(&self) -> QueryParams {
		self.inner.query.get()
	}

	/// Signal holding the current full path.
	pub fn path_signal(&self) -> Signal<String> {
		self.inner.path.clone()
	}

	/// Signal holding the current route parameters.
	pub fn route_signal(&self) -> Signal<RouteState> {
		self.inner.route.clone()
	}

	/// Signal holding the current query parameters.
	pub fn query_signal(&self) -> Signal<QueryParams> {
		self.inner.query.clone()
	}

	/// Matches `path` against the route table.
	pub fn match_path(&self, path: &str) -> Option<RouteState> {
		self.inner
			.routes
			.iter()
			.find_map(|route| route.match_path(path))
	}

	/// Builds a path for `params` with the first route that can hold them.
	///
	/// Falls back to `/` when no route fits.
	pub fn build_path(&self, params: &RouteState) -> String {
		self.inner
			.routes
			.iter()
			.find_map(|route| route.build(params))
			.unwrap_or_else(|| {
				tracing::debug!(%params, "no route can express parameters");
				"/".to_string()
			})
	}

	/// Registers a listener called after every route change.
	#[must_use = "dropping the subscription unsubscribes the listener"]
	pub fn on_change<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&NavigationToken) + 'static,
	{
		self.inner.changed.subscribe(listener)
	}

	/// Registers a listener called before a navigation updates the route.
	#[must_use = "dropping the subscription unsubscribes the listener"]
	pub fn on_before_page_load<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&PageLoadEvent) + 'static,
	{
		self.inner.before_page_load.subscribe(listener)
	}

	/// Starts tracking a new navigation and makes it current.
	pub fn begin_navigation(&self, navigation_type: NavigationType) -> NavigationToken {
		let id = self.inner.next_navigation.get() + 1;
		self.inner.next_navigation.set(id);
		let token = NavigationToken::new(id, navigation_type);
		*self.inner.navigation.borrow_mut() = Some(token.clone());
		token
	}

	/// The navigation currently in progress, if any.
	pub fn current_navigation(&self) -> Option<NavigationToken> {
		self.inner.navigation.borrow().clone()
	}

	/// Delays completion of the current navigation until `future` resolves.
	///
	/// Without a navigation in progress the future is dropped.
	pub fn wait_for<F>(&self, future: F)
	where
		F: Future<Output = ()> + 'static,
	{
		match self.current_navigation() {
			Some(token) => token.wait_for(future),
			None => tracing::debug!("wait_for called outside of a navigation"),
		}
	}

	/// Navigates to `path`.
	///
	/// The route is updated synchronously. The returned future resolves once
	/// everything the navigation waits for (view loading, redirects) has
	/// settled.
	pub fn navigate(
		&self,
		path: &str,
		options: NavigateOptions,
	) -> LocalBoxFuture<'static, NavigateResult> {
		let path = self.resolve_href(path);
		let navigation_type = if options.replace {
			NavigationType::Replace
		} else {
			NavigationType::Push
		};
		tracing::debug!(%path, %navigation_type, "navigating");

		let token = self.begin_navigation(navigation_type);
		self.inner.before_page_load.emit(&PageLoadEvent {
			path: path.clone(),
			token: token.clone(),
		});

		let key = if options.replace {
			self.inner.history.replace(path.clone(), options.data)
		} else {
			self.inner.history.push(path.clone(), options.data)
		};
		self.apply(&path);
		self.inner.changed.emit(&token);

		Self::settle(token, path, key)
	}

	/// Moves one entry back. Resolves to `None` at the start of history.
	pub fn back(&self) -> LocalBoxFuture<'static, Option<NavigateResult>> {
		self.go(-1)
	}

	/// Moves one entry forward. Resolves to `None` at the end of history.
	pub fn forward(&self) -> LocalBoxFuture<'static, Option<NavigateResult>> {
		self.go(1)
	}

	/// Moves the history cursor by `delta` and restores the target entry.
	pub fn go(&self, delta: isize) -> LocalBoxFuture<'static, Option<NavigateResult>> {
		let Some(entry) = self.inner.history.go(delta) else {
			return futures::future::ready(None).boxed_local();
		};
		let navigation_type = if delta < 0 {
			NavigationType::Back
		} else {
			NavigationType::Forward
		};
		let path = entry.path().to_string();
		tracing::debug!(%path, %navigation_type, delta, "traversing history");

		let token = self.begin_navigation(navigation_type);
		self.inner.before_page_load.emit(&PageLoadEvent {
			path: path.clone(),
			token: token.clone(),
		});
		self.apply(&path);
		self.inner.changed.emit(&token);
		self.inner.history.dispatch_pop_state();

		Self::settle(token, path, entry.key()).map(Some).boxed_local()
	}

	fn settle(
		token: NavigationToken,
		path: String,
		key: vista_history::EntryKey,
	) -> LocalBoxFuture<'static, NavigateResult> {
		let navigation_type = token.navigation_type();
		let settled = token.settled();
		async move {
			settled.await;
			NavigateResult {
				path,
				navigation_type,
				key,
			}
		}
		.boxed_local()
	}

	fn apply(&self, path: &str) {
		let (pathname, query, _) = split_path(path);
		let route = self.match_path(pathname).unwrap_or_else(|| {
			tracing::debug!(pathname, "no route matches path");
			RouteState::new()
		});
		let query = QueryParams::parse(query);
		self.inner.path.set_if_changed(path.to_string());
		self.inner.query.set_if_changed(query);
		self.inner.route.set_if_changed(route);
	}

	/// Turns a relative href (`?query`, `#hash`, `segment`) into a full path.
	fn resolve_href(&self, href: &str) -> String {
		if href.is_empty() {
			return self.path();
		}
		if href.starts_with('/') {
			return href.to_string();
		}
		let current = self.path();
		let (pathname, query, _) = split_path(&current);
		if href.starts_with('?') {
			format!("{}{}", pathname, href)
		} else if href.starts_with('#') {
			if query.is_empty() {
				format!("{}{}", pathname, href)
			} else {
				format!("{}?{}{}", pathname, query, href)
			}
		} else {
			format!("/{}", href)
		}
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("routes", &self.inner.routes.len())
			.field("path", &self.path())
			.finish()
	}
}
