//! Error types for routing.

use thiserror::Error;

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
	/// A route pattern could not be parsed.
	#[error("Invalid route pattern '{pattern}': {reason}")]
	InvalidPattern {
		/// The offending pattern.
		pattern: String,
		/// What is wrong with it.
		reason: String,
	},

	/// A parameter matcher regex failed to compile.
	#[error("Invalid parameter matcher: {0}")]
	InvalidMatcher(String),

	/// Navigation failed.
	#[error("Navigation failed: {0}")]
	NavigationFailed(String),
}

impl RouterError {
	pub(crate) fn pattern(pattern: &str, reason: impl Into<String>) -> Self {
		Self::InvalidPattern {
			pattern: pattern.to_string(),
			reason: reason.into(),
		}
	}
}

/// Result type for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
