//! Observable primitives.
//!
//! - [`Signal`]: a value with change notification
//! - [`Emitter`]: ordered synchronous event dispatch
//! - [`Subscription`]: RAII guard that unsubscribes on drop

mod emitter;
mod signal;

pub use emitter::{Emitter, Subscription};
pub use signal::{Signal, SignalId};
