//! # tally-engine
//!
//! Ledger store, adapter contracts, reconciliation engine, and run driver.
//!
//! Call [`runner::run_at`] to reconcile every registered user for a date, or
//! drive [`reconcile::Engine`] directly for a single (user, date) pair.

pub mod adapters;
pub mod error;
pub mod ledger;
pub mod reconcile;
pub mod runner;

pub use adapters::{AdapterError, HoursSource, Notifier};
pub use error::EngineError;
pub use ledger::Ledger;
pub use reconcile::{Engine, Outcome};
pub use runner::{RunReport, UserFailure};
