//! Vista Core - shared primitives
//!
//! Building blocks used by every other vista crate:
//!
//! - [`reactive`]: observable [`Signal`] values and ordered [`Emitter`]s
//! - [`spawn`]: the [`Spawner`] handle for the single-threaded scheduler
//!
//! Everything here is `!Send` on purpose: the view engine runs on one thread
//! and cooperates through local tasks, never through locks.

#![warn(missing_docs)]

pub mod reactive;
pub mod spawn;

pub use reactive::{Emitter, Signal, SignalId, Subscription};
pub use spawn::{Spawner, YieldNow, yield_now};
