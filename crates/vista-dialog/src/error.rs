//! Error types for dialogs.

use thiserror::Error;

/// Errors returned by dialog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogError {
	/// The commit hook refused the value; the dialog stays open.
	#[error("Commit rejected: {0}")]
	Rejected(String),

	/// The dialog is not open.
	#[error("Dialog is closed")]
	Closed,
}

/// Result type for dialog operations.
pub type Result<T> = std::result::Result<T, DialogError>;
