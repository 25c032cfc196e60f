//! Vista Dialog - queued dialogs
//!
//! A [`DialogQueue`] decides how many dialogs are on screen at once. In
//! [`DialogMode::Shared`] a single dialog is active and the rest wait in FIFO
//! order, all rendered into the same root element. In
//! [`DialogMode::Multiple`] up to `concurrent` dialogs are active, each in its
//! own root under the queue's container.
//!
//! ```ignore
//! use vista_dialog::{DialogMode, DialogOptions, DialogQueue, DialogQueueOptions, create_dialog};
//!
//! let queue = DialogQueue::new(DialogQueueOptions::shared(), Element::new("dialogs"));
//! let confirm = create_dialog(DialogOptions::new(&queue, |_| Element::text("Delete?")));
//! let answer = confirm.open().await;
//! ```

#![warn(missing_docs)]

pub mod dialog;
pub mod error;
pub mod portal;
pub mod queue;

pub use dialog::{CommitHook, Dialog, DialogOptions, RenderDialog, create_dialog};
pub use error::DialogError;
pub use portal::dialog_portal;
pub use queue::{DialogHandle, DialogMode, DialogQueue, DialogQueueOptions, DialogState};
