//! Route pattern parsing, matching and building.
//!
//! Patterns are lists of `/`-separated segments:
//!
//! - `users` - literal segment
//! - `{view}` - required parameter
//! - `{id?}` - optional parameter
//! - `{tab:general|advanced}` - parameter restricted to the listed values
//! - `{tab?:general|advanced}` - optional restricted parameter
//! - `*` - trailing wildcard, captured as `remainingSegments`
//!
//! Once an optional parameter appears, only optional parameters (and a final
//! `*`) may follow. A pattern is therefore a required prefix followed by an
//! optional suffix, and [`RouteInfo::min_length`] is the prefix length.

use std::collections::BTreeMap;

use crate::error::RouterError;
use crate::route_state::{REMAINING_SEGMENTS, RouteState, split_path};

/// Maximum allowed length for a route pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of segments in a route pattern.
const MAX_PATTERN_SEGMENTS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Param {
		name: String,
		optional: bool,
		allowed: Option<Vec<String>>,
	},
	Wildcard,
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
	pattern: String,
	segments: Vec<Segment>,
	params: BTreeMap<String, usize>,
	min_length: usize,
	wildcard: bool,
}

impl RouteInfo {
	/// Parses a route pattern.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`] if:
	/// - the pattern exceeds 1024 bytes or 32 segments
	/// - a parameter name is empty, malformed, duplicated or reserved
	/// - a required segment follows an optional one
	/// - `*` is not the last segment
	pub fn parse(pattern: &str) -> Result<Self, RouterError> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(RouterError::pattern(
				pattern,
				format!(
					"length {} exceeds maximum of {} bytes",
					pattern.len(),
					MAX_PATTERN_LENGTH
				),
			));
		}

		let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
		if raw.len() > MAX_PATTERN_SEGMENTS {
			return Err(RouterError::pattern(
				pattern,
				format!(
					"{} segments exceed maximum of {}",
					raw.len(),
					MAX_PATTERN_SEGMENTS
				),
			));
		}

		let mut segments = Vec::with_capacity(raw.len());
		let mut params = BTreeMap::new();
		let mut min_length = None;
		let mut wildcard = false;

		for (index, text) in raw.iter().enumerate() {
			if wildcard {
				return Err(RouterError::pattern(pattern, "'*' must be the last segment"));
			}
			let segment = parse_segment(pattern, text)?;
			match &segment {
				Segment::Literal(_) => {
					if min_length.is_some() {
						return Err(RouterError::pattern(
							pattern,
							format!("literal '{}' follows an optional parameter", text),
						));
					}
				}
				Segment::Param { name, optional, .. } => {
					if params.insert(name.clone(), index).is_some() {
						return Err(RouterError::pattern(
							pattern,
							format!("duplicate parameter '{}'", name),
						));
					}
					if *optional {
						min_length.get_or_insert(index);
					} else if min_length.is_some() {
						return Err(RouterError::pattern(
							pattern,
							format!("required parameter '{}' follows an optional parameter", name),
						));
					}
				}
				Segment::Wildcard => {
					wildcard = true;
					min_length.get_or_insert(index);
				}
			}
			segments.push(segment);
		}

		let min_length = min_length.unwrap_or(segments.len());
		Ok(Self {
			pattern: pattern.to_string(),
			segments,
			params,
			min_length,
			wildcard,
		})
	}

	/// The pattern string as written.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Parameter name to segment position.
	pub fn params(&self) -> &BTreeMap<String, usize> {
		&self.params
	}

	/// Segment position of `name`, if the pattern exposes it.
	pub fn position(&self, name: &str) -> Option<usize> {
		self.params.get(name).copied()
	}

	/// Number of leading segments every matching path must have.
	pub fn min_length(&self) -> usize {
		self.min_length
	}

	/// Whether the pattern ends with `*`.
	pub fn has_wildcard(&self) -> bool {
		self.wildcard
	}

	/// Whether `name` is a required parameter of this pattern.
	pub fn is_required(&self, name: &str) -> bool {
		self.position(name).is_some_and(|p| p < self.min_length)
	}

	/// Names of the required parameters, in segment order.
	pub fn required_params(&self) -> impl Iterator<Item = &str> {
		self.segments[..self.min_length]
			.iter()
			.filter_map(|segment| match segment {
				Segment::Param { name, .. } => Some(name.as_str()),
				_ => None,
			})
	}

	/// Whether the pattern can hold `value` for `name`.
	///
	/// `None` asks whether `name` may be left out.
	pub fn accepts(&self, name: &str, value: Option<&str>) -> bool {
		let value = value.filter(|v| !v.is_empty());
		if name == REMAINING_SEGMENTS {
			return value.is_none() || self.wildcard;
		}
		let Some(position) = self.position(name) else {
			return value.is_none();
		};
		match (&self.segments[position], value) {
			(Segment::Param { optional, .. }, None) => *optional,
			(Segment::Param { allowed: None, .. }, Some(_)) => true,
			(Segment::Param { allowed: Some(allowed), .. }, Some(v)) => {
				allowed.iter().any(|a| a == v)
			}
			_ => false,
		}
	}

	/// Matches a path against the pattern.
	///
	/// Any query string or hash is ignored. Segment values are
	/// percent-decoded.
	pub fn match_path(&self, path: &str) -> Option<RouteState> {
		let (pathname, _, _) = split_path(path);
		let parts: Vec<&str> = pathname.split('/').filter(|s| !s.is_empty()).collect();
		let mut state = RouteState::new();

		for (index, segment) in self.segments.iter().enumerate() {
			match segment {
				Segment::Wildcard => {
					let rest: Vec<String> = parts.iter().skip(index).map(|p| decode(p)).collect();
					state.insert(REMAINING_SEGMENTS, rest.join("/"));
					return Some(state);
				}
				Segment::Literal(literal) => match parts.get(index) {
					Some(part) if decode(part) == *literal => {}
					_ => return None,
				},
				Segment::Param {
					name,
					optional,
					allowed,
				} => match parts.get(index) {
					Some(part) => {
						let value = decode(part);
						if let Some(allowed) = allowed {
							if !allowed.contains(&value) {
								return None;
							}
						}
						state.insert(name.clone(), value);
					}
					None if *optional => {}
					None => return None,
				},
			}
		}

		if parts.len() > self.segments.len() {
			return None;
		}
		Some(state)
	}

	/// Builds a path holding `params`.
	///
	/// Returns `None` when the pattern cannot express the parameters: an
	/// unknown name, a missing required value, a value outside an allowed
	/// list, or a value placed after an omitted optional parameter.
	pub fn build(&self, params: &RouteState) -> Option<String> {
		for name in params.names() {
			if name != REMAINING_SEGMENTS && !self.params.contains_key(name) {
				return None;
			}
		}
		let remaining = params.get(REMAINING_SEGMENTS);
		if remaining.is_some() && !self.wildcard {
			return None;
		}

		let mut out: Vec<String> = Vec::with_capacity(self.segments.len());
		let mut truncated = false;
		for segment in &self.segments {
			match segment {
				Segment::Literal(literal) => out.push(encode(literal)),
				Segment::Param { name, optional, .. } => match params.get(name) {
					Some(value) => {
						if truncated || !self.accepts(name, Some(value)) {
							return None;
						}
						out.push(encode(value));
					}
					None if *optional => truncated = true,
					None => return None,
				},
				Segment::Wildcard => {
					if let Some(rest) = remaining {
						if truncated {
							return None;
						}
						out.extend(rest.split('/').filter(|s| !s.is_empty()).map(encode));
					}
				}
			}
		}

		Some(format!("/{}", out.join("/")))
	}
}

fn parse_segment(pattern: &str, text: &str) -> Result<Segment, RouterError> {
	if text == "*" {
		return Ok(Segment::Wildcard);
	}
	let Some(body) = text.strip_prefix('{') else {
		if text.contains(['{', '}']) {
			return Err(RouterError::pattern(
				pattern,
				format!("segment '{}' mixes literal text and a parameter", text),
			));
		}
		return Ok(Segment::Literal(text.to_string()));
	};
	let Some(body) = body.strip_suffix('}') else {
		return Err(RouterError::pattern(
			pattern,
			format!("unclosed parameter in '{}'", text),
		));
	};

	let (head, allowed) = match body.split_once(':') {
		Some((head, list)) => {
			let allowed: Vec<String> = list
				.split('|')
				.filter(|v| !v.is_empty())
				.map(str::to_string)
				.collect();
			if allowed.is_empty() {
				return Err(RouterError::pattern(
					pattern,
					format!("empty value list in '{}'", text),
				));
			}
			(head, Some(allowed))
		}
		None => (body, None),
	};
	let (name, optional) = match head.strip_suffix('?') {
		Some(name) => (name, true),
		None => (head, false),
	};
	validate_name(pattern, name)?;

	Ok(Segment::Param {
		name: name.to_string(),
		optional,
		allowed,
	})
}

fn validate_name(pattern: &str, name: &str) -> Result<(), RouterError> {
	let mut chars = name.chars();
	let valid = match chars.next() {
		Some(first) => {
			(first.is_ascii_alphabetic() || first == '_')
				&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
		}
		None => false,
	};
	if !valid {
		return Err(RouterError::pattern(
			pattern,
			format!("invalid parameter name '{}'", name),
		));
	}
	if name == REMAINING_SEGMENTS {
		return Err(RouterError::pattern(
			pattern,
			format!("'{}' is reserved for '*'", REMAINING_SEGMENTS),
		));
	}
	Ok(())
}

fn decode(segment: &str) -> String {
	urlencoding::decode(segment)
		.map(|s| s.into_owned())
		.unwrap_or_else(|_| segment.to_string())
}

fn encode(segment: &str) -> String {
	urlencoding::encode(segment).into_owned()
}
