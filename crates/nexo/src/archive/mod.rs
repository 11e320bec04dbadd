//! Batch archival of invoices and quotes.
//!
//! A run lists the documents still missing an archived PDF, then handles them
//! one at a time: assemble the render model, render, upload. Each document
//! ends in exactly one `success` or `error` log entry and a failed document
//! never stops the run.

mod assemble;
mod error;
mod event;
mod runner;
mod state;

pub use assemble::assemble_render_model;
pub use error::{ArchiveError, ItemFailure};
pub use event::ArchiveEvent;
pub use runner::{ArchiverOptions, BatchArchiver, Discovered, ItemOutcome};
pub use state::{LogEntry, LogLevel, RunPhase, RunReport, RunState};
