//! Tally core library — domain types, user registry, configuration, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs
//! - [`error`] — [`RegistryError`], [`ConfigError`]
//! - [`registry`] — load-or-seed / save
//! - [`config`] — [`Config`] loading

pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, RegistryError};
pub use types::{HoursEntry, LedgerEntry, User, UserId, Verdict};
