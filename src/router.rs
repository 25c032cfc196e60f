//! Route patterns, parameter matchers and navigation.
//!
//! # Examples
//!
//! ```rust
//! use vista::router::RouteInfo;
//!
//! let route = RouteInfo::parse("/{view}/{id?}").unwrap();
//! let state = route.match_path("/inbox/7").unwrap();
//! assert_eq!(state.value("id"), "7");
//! ```

pub use vista_router::*;
