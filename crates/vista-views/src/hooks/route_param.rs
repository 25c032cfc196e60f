//! Route parameter hook: use_route_param

use crate::app::ViewScope;

/// Reads route parameter `name` as seen by the view being rendered.
///
/// The value comes from the view's page snapshot, so a view that is leaving
/// keeps seeing the route it was mounted for. Returns `default` when the
/// parameter is absent.
pub fn use_route_param(scope: &ViewScope, name: &str, default: &str) -> String {
	scope.context().page().with(|page| {
		page.route
			.get(name)
			.map_or_else(|| default.to_string(), str::to_string)
	})
}
