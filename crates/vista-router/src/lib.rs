//! Vista Router - route patterns, parameter matching and navigation
//!
//! ## Route patterns
//!
//! ```ignore
//! use vista_router::{NavigateOptions, Router};
//! use vista_history::History;
//!
//! let router = Router::new(["/{view}/{id?}", "/"], History::new("/"))?;
//! let _ = router.navigate("/inbox/42", NavigateOptions::push());
//! assert_eq!(router.route().value("view"), "inbox");
//! assert_eq!(router.route().value("id"), "42");
//! ```
//!
//! ## Matchers
//!
//! Views select routes by matching parameter values, not by pattern:
//!
//! ```ignore
//! use vista_router::{Matcher, matches, param_matchers};
//!
//! let inbox = param_matchers([("view", Matcher::exact("inbox"))]);
//! assert!(matches(&inbox, &router.route()));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod matcher;
pub mod navigation;
pub mod pattern;
pub mod route_state;
pub mod router;

pub use error::RouterError;
pub use matcher::{Matchable, Matcher, ParamMatchers, best_match, matches, param_matchers};
pub use navigation::{
	NavigateOptions, NavigateResult, NavigationToken, NavigationType, PageLoadEvent,
};
pub use pattern::RouteInfo;
pub use route_state::{QueryParams, REMAINING_SEGMENTS, RouteState, split_path};
pub use router::Router;
