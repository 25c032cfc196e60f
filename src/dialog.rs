//! Queued dialogs.

pub use vista_dialog::*;
