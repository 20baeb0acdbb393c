//! Run driver — date policy and fan-out.
//!
//! The canonical entrypoint for a whole reconciliation run: validates the
//! target date, applies the weekend gate, then invokes the engine once per
//! registered user. A user's failure is isolated — it is collected in the
//! [`RunReport`] and the remaining users are still processed.

use std::path::Path;

use chrono::{Datelike, NaiveDate, Weekday};

use tally_core::registry;
use tally_core::types::UserId;

use crate::adapters::{HoursSource, Notifier};
use crate::error::EngineError;
use crate::ledger::Ledger;
use crate::reconcile::{Engine, Outcome};

/// Date format accepted on the run surface.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// One user whose reconciliation failed this run.
#[derive(Debug, Clone)]
pub struct UserFailure {
    pub user_id: UserId,
    pub name: String,
    pub error: String,
}

/// Summary of a whole run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Target date actually used (explicit or today).
    pub date: NaiveDate,
    /// The date fell on Saturday/Sunday; nothing was checked.
    pub weekend_skipped: bool,
    /// Users for which a fresh verdict was recorded.
    pub checked: usize,
    /// Users short-circuited by a prior complete entry.
    pub already_complete: usize,
    /// Users whose day was missing hours.
    pub missing: usize,
    /// Notifications actually delivered.
    pub notified: usize,
    /// Per-user failures (hours source unreachable, ledger write failed).
    pub failures: Vec<UserFailure>,
}

// ---------------------------------------------------------------------------
// Date policy
// ---------------------------------------------------------------------------

/// Parse an explicit `YYYY-MM-DD` target date; `None` means today.
///
/// Malformed input fails with [`EngineError::InvalidDate`] before any side
/// effect occurs.
pub fn parse_check_date(input: Option<&str>) -> Result<NaiveDate, EngineError> {
    match input {
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| {
            EngineError::InvalidDate { input: s.to_owned() }
        }),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run reconciliation for every registered user on `date`.
///
/// Weekend dates are a successful no-op: no registry seeding, no ledger
/// writes, no notifications. Otherwise the registry is loaded (seeding it on
/// first use), the ledger opened, and users processed in registry insertion
/// order.
pub fn run_at(
    home: &Path,
    expected_hours: f64,
    hours: &impl HoursSource,
    notifier: &impl Notifier,
    date: NaiveDate,
) -> Result<RunReport, EngineError> {
    let mut report = RunReport {
        date,
        weekend_skipped: false,
        checked: 0,
        already_complete: 0,
        missing: 0,
        notified: 0,
        failures: Vec::new(),
    };

    if is_weekend(date) {
        tracing::info!(%date, "weekend, nothing to check");
        report.weekend_skipped = true;
        return Ok(report);
    }

    let users = registry::load_or_seed_at(home)?;
    let mut ledger = Ledger::open_at(home)?;
    let engine = Engine::new(hours, notifier, expected_hours);

    for user in &users {
        tracing::info!(user = %user.name, %date, "checking working hours");
        match engine.reconcile(&mut ledger, user, date) {
            Ok(Outcome::AlreadyComplete) => report.already_complete += 1,
            Ok(Outcome::Recorded { verdict, sent, .. }) => {
                report.checked += 1;
                if verdict.is_missing() {
                    report.missing += 1;
                }
                if sent {
                    report.notified += 1;
                }
            }
            Err(e) => {
                tracing::warn!(user = %user.name, error = %e, "reconciliation failed");
                report.failures.push(UserFailure {
                    user_id: user.id,
                    name: user.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}
