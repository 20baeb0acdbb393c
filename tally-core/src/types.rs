//! Domain types for the tally registry and ledger.
//!
//! All dates are calendar dates (`NaiveDate`) — reconciliation works at
//! single-day granularity with no time-zone handling beyond "today" at the
//! call site. All types are serializable/deserializable via serde.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed identifier for a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for UserId {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Outcome of comparing a day's summed hours against the expected total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Complete,
    Missing,
}

impl Verdict {
    /// Judge a day's total against the expected daily hours.
    ///
    /// Equality is exact: any deviation, over or under, is `Missing`.
    /// No tolerance or rounding is applied.
    #[allow(clippy::float_cmp)]
    pub fn judge(total_hours: f64, expected_hours: f64) -> Self {
        if total_hours == expected_hours {
            Verdict::Complete
        } else {
            Verdict::Missing
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, Verdict::Missing)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Complete => write!(f, "complete"),
            Verdict::Missing => write!(f, "missing"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A registered user to check.
///
/// Created once at registry bootstrap; never mutated by the reconciliation
/// workflow. The contact triple (email, notify_email, phone) is unique
/// across the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Primary contact address.
    pub email: String,
    /// Override notification address; when absent, notifications go to
    /// the primary address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl User {
    /// Address notifications should be delivered to.
    pub fn notify_address(&self) -> &str {
        self.notify_email.as_deref().unwrap_or(&self.email)
    }
}

/// A single logged working-hours record from the time-tracking source.
///
/// Read-only to this system; many entries may exist for one (user, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoursEntry {
    pub email: String,
    pub date: NaiveDate,
    pub duration_hours: f64,
}

/// One reconciliation outcome for a (user, date) pair.
///
/// Ledger entries are append-only; the most recent entry for a pair is
/// authoritative. `missing == false` marks the day fully resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub user_id: UserId,
    pub check_date: NaiveDate,
    pub total_hours: f64,
    pub missing: bool,
    pub sent: bool,
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
