//! # Vista
//!
//! Declarative view routing and history-backed state for single-page
//! applications.
//!
//! Views are registered with parameter matchers rather than paths. The URL
//! layout lives in one ordered route table, and each view's canonical path is
//! derived from it. View containers follow the route, mount the most specific
//! matching view and keep navigations pending until the whole view tree has
//! settled.
//!
//! ## Feature Flags
//!
//! - `views` - view registry, containers, hooks and the application surface
//! - `dialog` - dialog queue with shared and multiple admission modes
//! - `full` (default) - everything
//!
//! The core building blocks (`core`, `history`, `router`) are always
//! available.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use futures::executor::LocalPool;
//! use vista::prelude::*;
//!
//! let mut pool = LocalPool::new();
//! let app = App::builder()
//!     .routes(["/{view}/{id?}", "/"])
//!     .initial_path("/inbox")
//!     .spawner(pool.spawner())
//!     .build()?;
//! let nav = app.navigator().clone();
//!
//! let inbox = nav.register_view(
//!     Loader::sync(|_| Ok(Markup::text("Inbox"))),
//!     params([("view", "inbox")]),
//! );
//! let message = nav.register_view(
//!     Loader::sync(|scope| Ok(Markup::text(use_route_param(scope, "id", "")))),
//!     params([("view", Matcher::exact("inbox")), ("id", Matcher::regex(r"^\d+$")?)]),
//! );
//!
//! let body = Element::new("body");
//! let spec = nav.render_view(serde_json::Value::Null, &[inbox, message])?;
//! pool.run_until(app.mount(&body, spec));
//!
//! // Canonical link for the message view, carrying over the current folder.
//! let link = nav.link_to(message, Some(&LinkTarget::params(RouteState::new().with("id", "42"))));
//! assert_eq!(link, "/inbox/42");
//! ```

pub mod core;
#[cfg(feature = "dialog")]
pub mod dialog;
pub mod history;
pub mod router;
#[cfg(feature = "views")]
pub mod views;

pub mod prelude;

// Re-export core types
pub use vista_core::{Emitter, Signal, Spawner, Subscription};

// Re-export history
pub use vista_history::{History, HistoryError, StateChange, StateMap};

// Re-export routing
pub use vista_router::{
	Matcher, NavigateOptions, NavigateResult, NavigationType, ParamMatchers, RouteInfo,
	RouteState, Router, RouterError,
};

// Re-export views
#[cfg(feature = "views")]
pub use vista_views::{
	App, AppBuilder, AppConfig, Element, LinkTarget, Loader, Markup, Navigator, ViewContext,
	ViewError, ViewHandle, ViewScope,
};

// Re-export dialogs
#[cfg(feature = "dialog")]
pub use vista_dialog::{Dialog, DialogError, DialogQueue, create_dialog, dialog_portal};
