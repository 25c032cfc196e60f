//! Error types for views.

use thiserror::Error;
use vista_history::HistoryError;
use vista_router::RouterError;

/// Errors raised by view registration, loading and rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
	/// A caller passed something the API cannot use, e.g. an unregistered view.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// An asynchronous component loader failed.
	#[error("Component load failed: {0}")]
	ComponentLoad(String),

	/// A component failed while rendering.
	#[error("Render failed: {0}")]
	Render(String),

	/// The route table could not be built.
	#[error(transparent)]
	Router(#[from] RouterError),

	/// Route state could not be read from or written to history.
	#[error(transparent)]
	History(#[from] HistoryError),
}

impl ViewError {
	/// Whether the error view may contain this error.
	pub fn is_containable(&self) -> bool {
		matches!(self, Self::ComponentLoad(_) | Self::Render(_))
	}
}

/// Result type for view operations.
pub type Result<T> = std::result::Result<T, ViewError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(ViewError::ComponentLoad("timeout".into()), true)]
	#[case(ViewError::Render("boom".into()), true)]
	#[case(ViewError::InvalidArgument("view".into()), false)]
	fn test_containable(#[case] error: ViewError, #[case] expected: bool) {
		assert_eq!(error.is_containable(), expected);
	}

	#[rstest]
	fn test_history_error_keeps_source() {
		use std::error::Error as _;

		let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
		let error: ViewError = HistoryError::Deserialize {
			key: "page".into(),
			source: std::sync::Arc::new(source),
		}
		.into();
		assert!(!error.is_containable());
		assert!(error.to_string().starts_with("Failed to deserialize history state 'page'"));
		assert!(error.source().is_some());
	}

	#[rstest]
	fn test_router_error_is_transparent() {
		let error: ViewError = RouterError::NavigationFailed("x".into()).into();
		assert_eq!(error.to_string(), "Navigation failed: x");
	}
}
