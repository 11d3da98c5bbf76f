//! Change-data-capture hooks.
//!
//! The storage engine publishes a [`TableEvent`] for every table operation.
//! Anything that wants to observe changes implements [`TableEventListener`]
//! and subscribes to an [`EventBus`].
//!
//! # Components
//! - [`TableEvent`] / [`TableEventKind`] - What happened, to which table, by which statement
//! - [`TableEventListener`] - Callback interface with no-op defaults
//! - [`EventBus`] - Fan-out to zero or more listeners
//! - [`CdcLogWriter`] - Listener appending statements to a checksummed log

mod event;
mod log_writer;

pub use event::{EventBus, TableEvent, TableEventKind, TableEventListener};
pub use log_writer::{read_log, CdcLogWriter};
