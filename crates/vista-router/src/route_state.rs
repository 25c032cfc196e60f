//! Decoded route parameters and query parameters.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved parameter holding the path tail captured by a `*` segment.
pub const REMAINING_SEGMENTS: &str = "remainingSegments";

/// Decoded path parameters of a URL.
///
/// Keys are kept in order. An empty value is the same as an absent one: it
/// is never stored, and [`RouteState::value`] returns `""` for both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteState {
	params: BTreeMap<String, String>,
}

impl RouteState {
	/// Creates an empty route state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the value of `name` if present.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Returns the value of `name`, or `""` when absent.
	pub fn value(&self, name: &str) -> &str {
		self.get(name).unwrap_or("")
	}

	/// Returns whether `name` has a non-empty value.
	pub fn contains(&self, name: &str) -> bool {
		self.params.contains_key(name)
	}

	/// Sets `name`; an empty value removes it.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();
		if value.is_empty() {
			self.params.remove(&name);
		} else {
			self.params.insert(name, value);
		}
	}

	/// Builder form of [`RouteState::insert`].
	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(name, value);
		self
	}

	/// Removes `name`, returning its value.
	pub fn remove(&mut self, name: &str) -> Option<String> {
		self.params.remove(name)
	}

	/// The path tail captured by a wildcard segment.
	pub fn remaining_segments(&self) -> &str {
		self.value(REMAINING_SEGMENTS)
	}

	/// Iterates over `(name, value)` pairs in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Iterates over parameter names in key order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.params.keys().map(String::as_str)
	}

	/// Number of present parameters.
	pub fn len(&self) -> usize {
		self.params.len()
	}

	/// Returns whether no parameter is present.
	pub fn is_empty(&self) -> bool {
		self.params.is_empty()
	}

	/// Returns the subset of parameters whose names satisfy `keep`.
	pub fn pick<F>(&self, mut keep: F) -> Self
	where
		F: FnMut(&str) -> bool,
	{
		Self {
			params: self
				.params
				.iter()
				.filter(|(k, _)| keep(k))
				.map(|(k, v)| (k.clone(), v.clone()))
				.collect(),
		}
	}

	/// Overlays `other` on top of `self`; values in `other` win.
	pub fn extend_from(&mut self, other: &RouteState) {
		for (k, v) in &other.params {
			self.params.insert(k.clone(), v.clone());
		}
	}
}

impl<K, V> FromIterator<(K, V)> for RouteState
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut state = Self::new();
		for (k, v) in iter {
			state.insert(k, v);
		}
		state
	}
}

impl fmt::Display for RouteState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("{")?;
		for (i, (k, v)) in self.params.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{}={}", k, v)?;
		}
		f.write_str("}")
	}
}

/// Decoded query string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams {
	params: BTreeMap<String, String>,
}

impl QueryParams {
	/// Creates an empty set of query parameters.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a query string, with or without the leading `?`.
	///
	/// Malformed input yields an empty set; a repeated key keeps its last value.
	pub fn parse(query: &str) -> Self {
		let query = query.strip_prefix('?').unwrap_or(query);
		let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_else(|error| {
			tracing::debug!(%error, query, "ignoring malformed query string");
			Vec::new()
		});
		Self {
			params: pairs.into_iter().collect(),
		}
	}

	/// Returns the value of `name` if present.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Sets `name`; an empty value removes it.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();
		if value.is_empty() {
			self.params.remove(&name);
		} else {
			self.params.insert(name, value);
		}
	}

	/// Returns whether no parameter is present.
	pub fn is_empty(&self) -> bool {
		self.params.is_empty()
	}

	/// Serializes back to a query string without the leading `?`.
	pub fn to_query_string(&self) -> String {
		serde_urlencoded::to_string(&self.params).unwrap_or_default()
	}
}

/// Splits a path into `(pathname, query, hash)`.
///
/// The query and hash are returned without their `?` / `#` prefix.
pub fn split_path(path: &str) -> (&str, &str, &str) {
	let (rest, hash) = match path.find('#') {
		Some(i) => (&path[..i], &path[i + 1..]),
		None => (path, ""),
	};
	let (pathname, query) = match rest.find('?') {
		Some(i) => (&rest[..i], &rest[i + 1..]),
		None => (rest, ""),
	};
	(pathname, query, hash)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_empty_value_is_absent() {
		let mut state = RouteState::new().with("view", "foo");
		state.insert("view", "");
		assert!(!state.contains("view"));
		assert_eq!(state.value("view"), "");
	}

	#[rstest]
	fn test_pick_and_extend() {
		let state: RouteState = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
		let mut picked = state.pick(|k| k != "b");
		assert_eq!(picked.to_string(), "{a=1, c=3}");

		picked.extend_from(&RouteState::new().with("a", "9"));
		assert_eq!(picked.value("a"), "9");
	}

	#[rstest]
	#[case("/a/b?x=1#top", ("/a/b", "x=1", "top"))]
	#[case("/a/b#top?x=1", ("/a/b", "", "top?x=1"))]
	#[case("/a", ("/a", "", ""))]
	#[case("/?q=", ("/", "q=", ""))]
	fn test_split_path(#[case] input: &str, #[case] expected: (&str, &str, &str)) {
		assert_eq!(split_path(input), expected);
	}

	#[rstest]
	fn test_query_params_roundtrip() {
		let query = QueryParams::parse("?page=2&q=hello%20world");
		assert_eq!(query.get("page"), Some("2"));
		assert_eq!(query.get("q"), Some("hello world"));
		assert_eq!(query.to_query_string(), "page=2&q=hello+world");
	}
}
