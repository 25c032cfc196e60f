//! Commonly used types.
//!
//! ```rust,ignore
//! use vista::prelude::*;
//! ```

pub use vista_core::{Signal, Subscription};
pub use vista_history::{History, StateChange};
pub use vista_router::{Matcher, NavigateOptions, RouteState, Router};

#[cfg(feature = "views")]
pub use vista_views::{
	App, Element, IntoMarkup, LinkTarget, Loader, Markup, Navigator, ViewScope, params,
	hooks::{use_query_param, use_route_param, use_route_state, use_view_context},
};

#[cfg(feature = "dialog")]
pub use vista_dialog::{
	DialogOptions, DialogQueue, DialogQueueOptions, create_dialog, dialog_portal,
};
