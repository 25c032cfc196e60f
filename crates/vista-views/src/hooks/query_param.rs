//! Query parameter hook: use_query_param

use futures::future::LocalBoxFuture;
use vista_router::{NavigateOptions, NavigateResult, Router, split_path};

use crate::app::ViewScope;
use crate::context::WeakViewContext;

/// Value and setter returned by [`use_query_param`].
#[derive(Clone)]
pub struct QueryParamHandle {
	name: String,
	default: String,
	router: Router,
	context: WeakViewContext,
}

impl QueryParamHandle {
	/// Current value as seen by the view, or the default.
	pub fn get(&self) -> String {
		let Some(context) = self.context.upgrade() else {
			return self.default.clone();
		};
		context.page().with(|page| {
			page.query
				.get(&self.name)
				.map_or_else(|| self.default.clone(), str::to_string)
		})
	}

	/// Rewrites the current entry with the parameter set to `value`.
	///
	/// An empty value removes the parameter. Returns `None` when the view is
	/// no longer active.
	pub fn set(&self, value: &str) -> Option<LocalBoxFuture<'static, NavigateResult>> {
		if !self.context.upgrade().is_some_and(|c| c.is_active()) {
			tracing::debug!(name = %self.name, "ignoring query write from inactive view");
			return None;
		}
		let mut query = self.router.query();
		query.set(self.name.as_str(), value);

		let current = self.router.path();
		let (pathname, _, hash) = split_path(&current);
		let mut path = pathname.to_string();
		let encoded = query.to_query_string();
		if !encoded.is_empty() {
			path.push('?');
			path.push_str(&encoded);
		}
		if !hash.is_empty() {
			path.push('#');
			path.push_str(hash);
		}
		Some(self.router.navigate(&path, NavigateOptions::replace()))
	}
}

impl std::fmt::Debug for QueryParamHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("QueryParamHandle")
			.field("name", &self.name)
			.field("value", &self.get())
			.finish()
	}
}

/// Binds query parameter `name` to the view.
pub fn use_query_param(scope: &ViewScope, name: &str, default: &str) -> QueryParamHandle {
	QueryParamHandle {
		name: name.to_string(),
		default: default.to_string(),
		router: scope.router().clone(),
		context: scope.context().downgrade(),
	}
}
