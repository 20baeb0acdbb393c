//! External-collaborator contracts.
//!
//! The engine only ever talks to the time-tracking source and the mail
//! service through these traits; concrete HTTP implementations live in the
//! CLI crate, and tests substitute in-memory spies.

use chrono::NaiveDate;
use thiserror::Error;

use tally_core::types::HoursEntry;

/// A failure reported by an external adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The remote service answered with a non-success HTTP status.
    #[error("{service} returned HTTP {status}")]
    Http { service: &'static str, status: u16 },

    /// The remote service could not be reached at all.
    #[error("{service} unreachable: {reason}")]
    Transport { service: &'static str, reason: String },

    /// The response body could not be decoded.
    #[error("{service} returned an unreadable response: {reason}")]
    Decode { service: &'static str, reason: String },
}

/// The time-tracking data source.
///
/// Contract: may return an empty collection (a day with nothing logged);
/// must never fabricate totals.
pub trait HoursSource {
    /// All logged duration entries for `email` on exactly `date`.
    fn working_hours(&self, email: &str, date: NaiveDate) -> Result<Vec<HoursEntry>, AdapterError>;
}

/// The outbound notification channel.
///
/// Contract: one delivery attempt per call, no partial-success semantics.
/// `Ok(())` means delivered; any `Err` means not delivered.
pub trait Notifier {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AdapterError>;
}
