//! Observable values, event emitters and task spawning.

pub use vista_core::*;
