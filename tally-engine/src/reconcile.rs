//! The reconciliation engine.
//!
//! ## `reconcile` — 5-step protocol
//!
//! 1. Short-circuit: a prior ledger entry with `missing == false` resolves
//!    the day; return with no side effects.
//! 2. Fetch all hours entries for (user, date); an empty result sums to 0.
//! 3. Verdict: exact-equality comparison against the expected daily hours.
//! 4. On a missing verdict, attempt exactly one notification; the delivery
//!    outcome is recorded, a failure is logged and not retried.
//! 5. Append the outcome to the ledger, durably, before returning.

use chrono::{NaiveDate, Utc};

use tally_core::types::{LedgerEntry, User, Verdict};

use crate::adapters::{HoursSource, Notifier};
use crate::error::EngineError;
use crate::ledger::Ledger;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of reconciling one (user, date) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A prior entry already marks the day complete; nothing was done.
    AlreadyComplete,
    /// A verdict was computed and a ledger entry appended.
    Recorded {
        total_hours: f64,
        verdict: Verdict,
        /// Whether a notification was delivered (always `false` for a
        /// complete day — none is attempted).
        sent: bool,
    },
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Per-(user, date) reconciliation over injected adapter contracts.
pub struct Engine<'a, H: HoursSource, N: Notifier> {
    hours: &'a H,
    notifier: &'a N,
    expected_hours: f64,
}

impl<'a, H: HoursSource, N: Notifier> Engine<'a, H, N> {
    pub fn new(hours: &'a H, notifier: &'a N, expected_hours: f64) -> Self {
        Self {
            hours,
            notifier,
            expected_hours,
        }
    }

    /// Produce and persist a daily verdict for one user.
    ///
    /// `date` must be a working day — the run driver applies the weekend
    /// gate before calling in. At most one outbound notification and at most
    /// one ledger write occur per invocation.
    ///
    /// A hours-source failure aborts this user only: the error propagates
    /// with no ledger write and no notification.
    pub fn reconcile(
        &self,
        ledger: &mut Ledger,
        user: &User,
        date: NaiveDate,
    ) -> Result<Outcome, EngineError> {
        // Step 1: the idempotency gate.
        if let Some(prior) = ledger.latest_entry(user.id, date) {
            if !prior.missing {
                tracing::info!(user = %user.name, %date, "already complete, skipping");
                return Ok(Outcome::AlreadyComplete);
            }
        }

        // Step 2: fetch and sum.
        let entries = self.hours.working_hours(&user.email, date)?;
        let total_hours: f64 = entries.iter().map(|e| e.duration_hours).sum();

        // Step 3: verdict.
        let verdict = Verdict::judge(total_hours, self.expected_hours);

        // Step 4: notify on missing.
        let mut sent = false;
        if verdict.is_missing() {
            let to = user.notify_address();
            let subject = format!("Missing working hours {date}");
            let body = format!("Today you input {total_hours} hours, please recheck it!");
            tracing::info!(%to, %date, total_hours, "sending missing-hours notification");
            match self.notifier.send(to, &subject, &body) {
                Ok(()) => sent = true,
                Err(e) => {
                    // Recorded as sent=false; a later run may re-check the day.
                    tracing::warn!(%to, error = %e, "notification delivery failed");
                }
            }
        }

        // Step 5: durable append.
        ledger.append(LedgerEntry {
            user_id: user.id,
            check_date: date,
            total_hours,
            missing: verdict.is_missing(),
            sent,
            recorded_at: Utc::now(),
        })?;

        Ok(Outcome::Recorded {
            total_hours,
            verdict,
            sent,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use tally_core::types::{HoursEntry, UserId};
    use tempfile::TempDir;

    use super::*;
    use crate::adapters::AdapterError;

    // -- spies ------------------------------------------------------------

    /// Hours source spy: canned durations, call counting, optional failure.
    struct SpyHours {
        durations: Vec<f64>,
        fail: bool,
        calls: RefCell<usize>,
    }

    impl SpyHours {
        fn returning(durations: &[f64]) -> Self {
            Self {
                durations: durations.to_vec(),
                fail: false,
                calls: RefCell::new(0),
            }
        }

        fn unreachable_source() -> Self {
            Self {
                durations: vec![],
                fail: true,
                calls: RefCell::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl HoursSource for SpyHours {
        fn working_hours(
            &self,
            email: &str,
            date: NaiveDate,
        ) -> Result<Vec<HoursEntry>, AdapterError> {
            *self.calls.borrow_mut() += 1;
            if self.fail {
                return Err(AdapterError::Transport {
                    service: "tms",
                    reason: "connection refused".into(),
                });
            }
            Ok(self
                .durations
                .iter()
                .map(|&duration_hours| HoursEntry {
                    email: email.to_owned(),
                    date,
                    duration_hours,
                })
                .collect())
        }
    }

    /// Notifier spy: records (to, subject, body), optional delivery failure.
    #[derive(Default)]
    struct SpyNotifier {
        fail: bool,
        sent: RefCell<Vec<(String, String, String)>>,
    }

    impl SpyNotifier {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn messages(&self) -> Vec<(String, String, String)> {
            self.sent.borrow().clone()
        }
    }

    impl Notifier for SpyNotifier {
        fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AdapterError> {
            self.sent
                .borrow_mut()
                .push((to.into(), subject.into(), body.into()));
            if self.fail {
                return Err(AdapterError::Http {
                    service: "mailgun",
                    status: 503,
                });
            }
            Ok(())
        }
    }

    // -- fixtures ---------------------------------------------------------

    fn user() -> User {
        User {
            id: UserId(1),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            notify_email: None,
            phone: None,
        }
    }

    fn date() -> NaiveDate {
        "2024-03-04".parse().unwrap() // a Monday
    }

    // -- scenarios --------------------------------------------------------

    #[test]
    fn complete_day_writes_entry_and_sends_nothing() {
        let home = TempDir::new().unwrap();
        let mut ledger = Ledger::open_at(home.path()).unwrap();
        let hours = SpyHours::returning(&[4.0, 4.0]);
        let notifier = SpyNotifier::default();

        let outcome = Engine::new(&hours, &notifier, 8.0)
            .reconcile(&mut ledger, &user(), date())
            .expect("reconcile");

        assert_eq!(
            outcome,
            Outcome::Recorded {
                total_hours: 8.0,
                verdict: Verdict::Complete,
                sent: false,
            }
        );
        assert!(notifier.messages().is_empty());
        let entry = ledger.latest_entry(UserId(1), date()).expect("entry");
        assert_eq!(entry.total_hours, 8.0);
        assert!(!entry.missing);
        assert!(!entry.sent);
    }

    #[test]
    fn short_hours_notify_with_date_and_total() {
        let home = TempDir::new().unwrap();
        let mut ledger = Ledger::open_at(home.path()).unwrap();
        let hours = SpyHours::returning(&[4.0, 2.5]);
        let notifier = SpyNotifier::default();

        let outcome = Engine::new(&hours, &notifier, 8.0)
            .reconcile(&mut ledger, &user(), date())
            .expect("reconcile");

        assert_eq!(
            outcome,
            Outcome::Recorded {
                total_hours: 6.5,
                verdict: Verdict::Missing,
                sent: true,
            }
        );
        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        let (to, subject, body) = &messages[0];
        assert_eq!(to, "alice@example.com");
        assert!(subject.contains("2024-03-04"), "subject: {subject}");
        assert!(body.contains("6.5"), "body: {body}");

        let entry = ledger.latest_entry(UserId(1), date()).expect("entry");
        assert_eq!(entry.total_hours, 6.5);
        assert!(entry.missing);
        assert!(entry.sent);
    }

    #[test]
    fn over_logging_is_also_missing() {
        let home = TempDir::new().unwrap();
        let mut ledger = Ledger::open_at(home.path()).unwrap();
        let hours = SpyHours::returning(&[8.0, 1.0]);
        let notifier = SpyNotifier::default();

        Engine::new(&hours, &notifier, 8.0)
            .reconcile(&mut ledger, &user(), date())
            .expect("reconcile");

        assert_eq!(notifier.messages().len(), 1);
        assert!(ledger.latest_entry(UserId(1), date()).unwrap().missing);
    }

    #[test]
    fn no_entries_at_all_totals_zero_and_notifies() {
        let home = TempDir::new().unwrap();
        let mut ledger = Ledger::open_at(home.path()).unwrap();
        let hours = SpyHours::returning(&[]);
        let notifier = SpyNotifier::default();

        let outcome = Engine::new(&hours, &notifier, 8.0)
            .reconcile(&mut ledger, &user(), date())
            .expect("reconcile");

        assert_eq!(
            outcome,
            Outcome::Recorded {
                total_hours: 0.0,
                verdict: Verdict::Missing,
                sent: true,
            }
        );
        assert!(notifier.messages()[0].2.contains('0'));
    }

    #[test]
    fn notify_goes_to_override_address_when_present() {
        let home = TempDir::new().unwrap();
        let mut ledger = Ledger::open_at(home.path()).unwrap();
        let hours = SpyHours::returning(&[2.0]);
        let notifier = SpyNotifier::default();
        let user = User {
            notify_email: Some("alice.alt@example.com".into()),
            ..user()
        };

        Engine::new(&hours, &notifier, 8.0)
            .reconcile(&mut ledger, &user, date())
            .expect("reconcile");

        assert_eq!(notifier.messages()[0].0, "alice.alt@example.com");
    }

    #[test]
    fn delivery_failure_records_sent_false_and_is_not_fatal() {
        let home = TempDir::new().unwrap();
        let mut ledger = Ledger::open_at(home.path()).unwrap();
        let hours = SpyHours::returning(&[3.0]);
        let notifier = SpyNotifier::failing();

        let outcome = Engine::new(&hours, &notifier, 8.0)
            .reconcile(&mut ledger, &user(), date())
            .expect("delivery failure must not error the engine");

        assert_eq!(
            outcome,
            Outcome::Recorded {
                total_hours: 3.0,
                verdict: Verdict::Missing,
                sent: false,
            }
        );
        assert_eq!(notifier.messages().len(), 1, "exactly one attempt");
        let entry = ledger.latest_entry(UserId(1), date()).expect("entry");
        assert!(entry.missing);
        assert!(!entry.sent);
    }

    #[test]
    fn complete_day_short_circuits_without_touching_adapters() {
        let home = TempDir::new().unwrap();
        let mut ledger = Ledger::open_at(home.path()).unwrap();
        let notifier = SpyNotifier::default();

        // First run resolves the day.
        let first = SpyHours::returning(&[8.0]);
        Engine::new(&first, &notifier, 8.0)
            .reconcile(&mut ledger, &user(), date())
            .expect("first run");
        assert_eq!(ledger.entries().len(), 1);

        // Second run must not query the source, notify, or append.
        let second = SpyHours::returning(&[0.0]);
        let outcome = Engine::new(&second, &notifier, 8.0)
            .reconcile(&mut ledger, &user(), date())
            .expect("second run");

        assert_eq!(outcome, Outcome::AlreadyComplete);
        assert_eq!(second.calls(), 0, "hours source must not be queried");
        assert!(notifier.messages().is_empty());
        assert_eq!(ledger.entries().len(), 1, "no new ledger entry");
    }

    #[test]
    fn missing_day_is_rechecked_on_a_later_run() {
        let home = TempDir::new().unwrap();
        let mut ledger = Ledger::open_at(home.path()).unwrap();
        let notifier = SpyNotifier::default();

        let first = SpyHours::returning(&[6.5]);
        Engine::new(&first, &notifier, 8.0)
            .reconcile(&mut ledger, &user(), date())
            .expect("first run");

        // The user has since filled in their hours.
        let second = SpyHours::returning(&[8.0]);
        let outcome = Engine::new(&second, &notifier, 8.0)
            .reconcile(&mut ledger, &user(), date())
            .expect("second run");

        assert_eq!(second.calls(), 1, "unresolved day is re-checked");
        assert_eq!(
            outcome,
            Outcome::Recorded {
                total_hours: 8.0,
                verdict: Verdict::Complete,
                sent: false,
            }
        );
        assert_eq!(ledger.entries().len(), 2, "re-check appends, never rewrites");
        assert!(!ledger.latest_entry(UserId(1), date()).unwrap().missing);
    }

    #[test]
    fn unreachable_source_aborts_with_no_side_effects() {
        let home = TempDir::new().unwrap();
        let mut ledger = Ledger::open_at(home.path()).unwrap();
        let hours = SpyHours::unreachable_source();
        let notifier = SpyNotifier::default();

        let err = Engine::new(&hours, &notifier, 8.0)
            .reconcile(&mut ledger, &user(), date())
            .unwrap_err();

        assert!(matches!(err, EngineError::Adapter(_)), "got: {err}");
        assert!(notifier.messages().is_empty());
        assert!(ledger.entries().is_empty(), "no ledger write on fetch failure");
    }
}
