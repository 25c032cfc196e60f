//! Route-parameter matchers.
//!
//! A view declares which routes it owns with a map from parameter name to
//! [`Matcher`]. A route matches when every declared matcher accepts the
//! route's value for that name; undeclared parameters are ignored.
//!
//! When several candidates match, the one with the most declared matchers
//! wins. On ties the earlier candidate wins.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use regex::Regex;

use crate::error::RouterError;
use crate::route_state::RouteState;

/// Maximum compiled size of a matcher regex.
const MAX_MATCHER_REGEX_SIZE: usize = 1 << 20;

/// A constraint on one route parameter.
#[derive(Clone)]
pub enum Matcher {
	/// The parameter must be absent (or empty).
	Absent,
	/// The parameter must equal the string.
	Exact(String),
	/// The predicate must accept the value; an absent parameter reads as `""`.
	Predicate(Rc<dyn Fn(&str) -> bool>),
	/// The regex must match the value; an absent parameter reads as `""`.
	Pattern(Regex),
}

impl Matcher {
	/// Matcher requiring the parameter to be absent.
	pub fn absent() -> Self {
		Self::Absent
	}

	/// Matcher requiring an exact value.
	///
	/// An empty string is the same as [`Matcher::Absent`].
	pub fn exact(value: impl Into<String>) -> Self {
		let value = value.into();
		if value.is_empty() {
			Self::Absent
		} else {
			Self::Exact(value)
		}
	}

	/// Matcher running `predicate` against the value, or `""` when absent.
	pub fn predicate<F>(predicate: F) -> Self
	where
		F: Fn(&str) -> bool + 'static,
	{
		Self::Predicate(Rc::new(predicate))
	}

	/// Matcher compiling `pattern` to a regex.
	///
	/// Any non-empty value is matched by `"."`.
	pub fn regex(pattern: &str) -> Result<Self, RouterError> {
		regex::RegexBuilder::new(pattern)
			.size_limit(MAX_MATCHER_REGEX_SIZE)
			.build()
			.map(Self::Pattern)
			.map_err(|e| RouterError::InvalidMatcher(format!("{}: {}", pattern, e)))
	}

	/// Whether a route pattern must expose the parameter for this matcher.
	pub fn requires_presence(&self) -> bool {
		!matches!(self, Self::Absent)
	}

	/// The literal value of an [`Matcher::Exact`] matcher.
	pub fn exact_value(&self) -> Option<&str> {
		match self {
			Self::Exact(value) => Some(value),
			_ => None,
		}
	}

	/// Tests a (possibly absent) parameter value.
	pub fn test(&self, value: Option<&str>) -> bool {
		let value = value.unwrap_or_default();
		match self {
			Self::Absent => value.is_empty(),
			Self::Exact(expected) => expected == value,
			Self::Predicate(predicate) => predicate(value),
			Self::Pattern(regex) => regex.is_match(value),
		}
	}
}

impl From<&str> for Matcher {
	fn from(value: &str) -> Self {
		Self::exact(value)
	}
}

impl From<String> for Matcher {
	fn from(value: String) -> Self {
		Self::exact(value)
	}
}

impl From<Regex> for Matcher {
	fn from(regex: Regex) -> Self {
		Self::Pattern(regex)
	}
}

impl fmt::Debug for Matcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Absent => f.write_str("Absent"),
			Self::Exact(value) => f.debug_tuple("Exact").field(value).finish(),
			Self::Predicate(_) => f.write_str("Predicate(<fn>)"),
			Self::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
		}
	}
}

/// Parameter name to matcher.
pub type ParamMatchers = BTreeMap<String, Matcher>;

/// Builds a [`ParamMatchers`] map from `(name, matcher)` pairs.
pub fn param_matchers<I, K, M>(pairs: I) -> ParamMatchers
where
	I: IntoIterator<Item = (K, M)>,
	K: Into<String>,
	M: Into<Matcher>,
{
	pairs
		.into_iter()
		.map(|(k, m)| (k.into(), m.into()))
		.collect()
}

/// Returns whether every matcher accepts the corresponding route value.
pub fn matches(matchers: &ParamMatchers, route: &RouteState) -> bool {
	matchers
		.iter()
		.all(|(name, matcher)| matcher.test(route.get(name)))
}

/// Something that owns a set of matchers and can compete for a route.
pub trait Matchable {
	/// The candidate's matchers.
	fn matchers(&self) -> &ParamMatchers;

	/// Ranking used to break overlaps; higher wins.
	fn specificity(&self) -> usize {
		self.matchers().len()
	}
}

impl Matchable for ParamMatchers {
	fn matchers(&self) -> &ParamMatchers {
		self
	}
}

/// Picks the most specific candidate matching `route`.
///
/// Candidates are considered in order; a later candidate only wins with a
/// strictly higher specificity.
pub fn best_match<'a, T, I>(candidates: I, route: &RouteState) -> Option<&'a T>
where
	T: Matchable + ?Sized + 'a,
	I: IntoIterator<Item = &'a T>,
{
	let mut best: Option<&'a T> = None;
	for candidate in candidates {
		if !matches(candidate.matchers(), route) {
			continue;
		}
		match best {
			Some(current) if current.specificity() >= candidate.specificity() => {}
			_ => best = Some(candidate),
		}
	}
	best
}
