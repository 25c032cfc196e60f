//! Canonical path resolution.
//!
//! [`resolve_path`] computes the shortest path that selects a view. The path
//! keeps the current route's values for parameters the view cannot do
//! without, takes override values for any parameter the view's patterns can
//! carry and always applies the view's own constant parameters last.

use std::collections::BTreeSet;

use vista_router::{
	Matchable, Matcher, REMAINING_SEGMENTS, RouteInfo, RouteState, Router,
};

use crate::registry::{ParamBounds, ViewHandle, ViewRegistration, ViewRegistry};

/// Parameters, query and hash of a link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTarget {
	/// Route parameter overrides.
	pub params: RouteState,
	/// Query string, with or without the leading `?`.
	pub query: Option<String>,
	/// Fragment, with or without the leading `#`.
	pub hash: Option<String>,
}

impl LinkTarget {
	/// A target overriding route parameters only.
	pub fn params(params: RouteState) -> Self {
		Self {
			params,
			query: None,
			hash: None,
		}
	}

	/// Sets the query string.
	pub fn with_query(mut self, query: impl Into<String>) -> Self {
		self.query = Some(query.into());
		self
	}

	/// Sets the fragment.
	pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
		self.hash = Some(hash.into());
		self
	}
}

impl From<RouteState> for LinkTarget {
	fn from(params: RouteState) -> Self {
		Self::params(params)
	}
}

/// Resolves the canonical path of `view`.
///
/// Unregistered views resolve to `/`.
pub fn resolve_path(
	registry: &ViewRegistry,
	router: &Router,
	view: ViewHandle,
	target: Option<&LinkTarget>,
) -> String {
	let Some(registration) = registry.get(view) else {
		tracing::debug!(%view, "resolving unregistered view to /");
		return "/".to_string();
	};
	let bounds = registration.bounds(|| compute_bounds(&registration, registry, router.routes()));

	let current = router.route();
	let mut params = current.pick(|name| bounds.min.contains(name));
	if let Some(target) = target {
		params.extend_from(&target.params.pick(|name| bounds.max.contains(name)));
	}
	params.extend_from(registration.constant_params());

	let mut path = router.build_path(&params);
	if let Some(target) = target {
		append_suffix(&mut path, '?', target.query.as_deref());
		append_suffix(&mut path, '#', target.hash.as_deref());
	}
	path
}

fn append_suffix(path: &mut String, prefix: char, part: Option<&str>) {
	let part = part.map(|p| p.strip_prefix(prefix).unwrap_or(p));
	if let Some(part) = part.filter(|p| !p.is_empty()) {
		path.push(prefix);
		path.push_str(part);
	}
}

/// Computes which parameters a view's canonical path may carry.
pub fn compute_bounds(
	registration: &ViewRegistration,
	registry: &ViewRegistry,
	routes: &[RouteInfo],
) -> ParamBounds {
	let compatible: Vec<&RouteInfo> = routes
		.iter()
		.filter(|route| is_compatible(registration, route))
		.collect();

	let candidates = if compatible.len() > 1 {
		let used = registry.used_params();
		let narrowed: Vec<&RouteInfo> = compatible
			.iter()
			.copied()
			.filter(|route| {
				route
					.params()
					.keys()
					.all(|name| !used.contains(name) || registration.matchers().contains_key(name))
			})
			.collect();
		if narrowed.is_empty() { compatible } else { narrowed }
	} else {
		compatible
	};

	let mut max: BTreeSet<String> = candidates
		.iter()
		.flat_map(|route| route.params().keys().cloned())
		.collect();
	max.insert(REMAINING_SEGMENTS.to_string());

	// Carried over from the current route: whatever the most specific pattern
	// or the view's own matchers cannot do without, minus pinned constants.
	let constants = registration.constant_params();
	let min = candidates
		.last()
		.map(|route| {
			route
				.params()
				.keys()
				.filter(|name| {
					route.is_required(name)
						|| registration
							.matchers()
							.get(name.as_str())
							.is_some_and(Matcher::requires_presence)
				})
				.filter(|name| !constants.contains(name))
				.cloned()
				.collect()
		})
		.unwrap_or_default();

	tracing::debug!(
		view = %registration.handle(),
		compatible = candidates.len(),
		?max,
		?min,
		"view parameter bounds computed"
	);
	ParamBounds { max, min }
}

fn is_compatible(registration: &ViewRegistration, route: &RouteInfo) -> bool {
	registration.matchers().iter().all(|(name, matcher)| {
		if name == REMAINING_SEGMENTS {
			return true;
		}
		match (matcher, route.position(name)) {
			(Matcher::Absent, None) => true,
			(Matcher::Absent, Some(_)) => !route.is_required(name),
			(_, None) => false,
			(Matcher::Exact(value), Some(_)) => route.accepts(name, Some(value)),
			(_, Some(_)) => true,
		}
	})
}
