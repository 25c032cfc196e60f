//! Application configuration.
//!
//! ```toml
//! routes = ["/{view}/{id?}", "/"]
//! initial_path = "/inbox"
//! transition_trigger = "page"
//! max_redirects = 5
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vista_router::{RouteInfo, RouterError};

/// Default cap on consecutive canonical-path redirects.
pub const MAX_REDIRECT_DEPTH: usize = 5;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The TOML document is malformed.
	#[error("Failed to parse configuration: {0}")]
	Parse(#[from] toml::de::Error),

	/// A configured route pattern is invalid.
	#[error(transparent)]
	Router(#[from] RouterError),
}

/// Settings of an [`App`](crate::App).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// Route patterns, tried in order.
	pub routes: Vec<String>,
	/// Path of the first history entry.
	pub initial_path: String,
	/// Trigger name passed to the animator.
	pub transition_trigger: String,
	/// Consecutive canonical-path redirects honoured before a view mounts
	/// anyway.
	pub max_redirects: usize,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			routes: vec!["/".to_string()],
			initial_path: "/".to_string(),
			transition_trigger: "page".to_string(),
			max_redirects: MAX_REDIRECT_DEPTH,
		}
	}
}

impl AppConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(source)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks that every route pattern parses.
	pub fn validate(&self) -> Result<(), ConfigError> {
		for route in &self.routes {
			RouteInfo::parse(route)?;
		}
		Ok(())
	}
}
