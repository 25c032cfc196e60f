//! Error types for the history state store.

use std::sync::Arc;

use thiserror::Error;

/// Error type for typed state access. Clones share the serde source.
#[derive(Debug, Clone, Error)]
pub enum HistoryError {
	/// A value could not be serialized into the state map.
	#[error("Failed to serialize history state '{key}': {source}")]
	Serialize {
		/// State key.
		key: String,
		/// Underlying serde error.
		#[source]
		source: Arc<serde_json::Error>,
	},

	/// A stored value does not deserialize into the requested type.
	#[error("Failed to deserialize history state '{key}': {source}")]
	Deserialize {
		/// State key.
		key: String,
		/// Underlying serde error.
		#[source]
		source: Arc<serde_json::Error>,
	},
}

impl HistoryError {
	pub(crate) fn serialize(key: impl Into<String>, source: serde_json::Error) -> Self {
		Self::Serialize {
			key: key.into(),
			source: Arc::new(source),
		}
	}

	pub(crate) fn deserialize(key: impl Into<String>, source: serde_json::Error) -> Self {
		Self::Deserialize {
			key: key.into(),
			source: Arc::new(source),
		}
	}

	/// The state key involved.
	pub fn key(&self) -> &str {
		match self {
			Self::Serialize { key, .. } | Self::Deserialize { key, .. } => key,
		}
	}
}

// serde_json errors are not comparable; equal messages are treated as equal.
impl PartialEq for HistoryError {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(
				Self::Serialize { key: a, source: x },
				Self::Serialize { key: b, source: y },
			)
			| (
				Self::Deserialize { key: a, source: x },
				Self::Deserialize { key: b, source: y },
			) => a == b && x.to_string() == y.to_string(),
			_ => false,
		}
	}
}

impl Eq for HistoryError {}

/// Result type for history state operations.
pub type Result<T> = std::result::Result<T, HistoryError>;
