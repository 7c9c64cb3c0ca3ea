//! Report Model - Evaluation reports, cash ledger and display formatting
//!
//! This crate holds the read-only data the export pipeline consumes:
//! physical evaluation reports as served by the API, the daily cash ledger,
//! the pt-BR formatting helpers used by every export, the provider boundary
//! that loads those snapshots, and a small typed notifier used to surface
//! export outcomes to the caller.

mod error;
mod evaluation;
mod ledger;
pub mod format;
pub mod classify;
mod provider;
mod notify;

pub use error::*;
pub use evaluation::*;
pub use ledger::*;
pub use provider::*;
pub use notify::*;
