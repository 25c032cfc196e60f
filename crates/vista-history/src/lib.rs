//! Vista History - history-backed state store
//!
//! Every history entry owns a key/value [`StateMap`]. Views read and write the
//! map of the *current* entry; back/forward navigation restores the map of the
//! target entry. "Snapshot" writes clone the current entry forward into a new
//! one so the previous value stays reachable with the back button.
//!
//! ## Example
//!
//! ```ignore
//! use vista_history::History;
//! use serde_json::json;
//!
//! let history = History::new("/");
//! history.set_state("tab", json!("general"), false);
//! history.set_state("tab", json!("advanced"), true); // pushes a new entry
//!
//! history.traverse(-1);
//! assert_eq!(history.current_states().get("tab"), Some(json!("general")));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod history;
pub mod state;

pub use error::HistoryError;
pub use history::{EntryKey, History, HistoryEntry, PopStateEvent, StateChange};
pub use state::StateMap;
