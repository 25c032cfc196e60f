//! View registry, containers and hooks.
//!
//! This module provides access to vista-views: the [`App`] and its
//! [`Navigator`], route-driven view containers and the hooks components use
//! to read and write route-derived state.

pub use vista_views::*;
