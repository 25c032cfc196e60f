//! Session history with per-entry state maps.
//!
//! # Examples
//!
//! ```rust
//! use vista::history::{History, StateChange};
//!
//! let history = History::new("/list");
//! assert_eq!(history.set_state("sort", "date".into(), true), StateChange::Updated);
//! assert_eq!(history.set_state("sort", "name".into(), true), StateChange::Snapshot);
//! assert_eq!(history.len(), 2);
//! ```

pub use vista_history::*;
