//! `tally run` — reconcile every registered user for a date.
//!
//! This is the guarded boundary of the process: once the target date has
//! validated, any error escaping the run is formatted and sent best-effort to
//! the configured operator address through the same notifier contract used
//! for regular notifications. A failure of that alert is logged and goes no
//! further.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tally_core::config::{self, Config};
use tally_engine::adapters::Notifier;
use tally_engine::runner::{self, RunReport};
use tally_engine::EngineError;

use crate::adapters::{mailgun::MailgunNotifier, tms::HttpHoursSource};

/// Arguments for `tally run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Target date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Path to the configuration file (default: ~/.tally/config.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let config = match &self.config {
            Some(path) => config::load(path),
            None => config::load_at(&home),
        }
        .context("failed to load configuration")?;

        // Validation errors belong to the caller, not the operator: a bad
        // date format fails here, before any side effect and before the
        // alert boundary below.
        let date = runner::parse_check_date(self.date.as_deref())?;

        let hours = HttpHoursSource::new(&config.tms);
        let notifier = MailgunNotifier::new(&config.mailgun);

        match runner::run_at(&home, config.expected_daily_hours, &hours, &notifier, date) {
            Ok(report) => {
                print_report(&report);
                Ok(())
            }
            Err(e) => {
                alert_operator(&notifier, &config, &e);
                Err(e.into())
            }
        }
    }
}

/// Forward an otherwise-unhandled run failure to the operator address.
///
/// Best-effort and non-recursive: if the alert itself cannot be delivered,
/// that failure is only logged.
fn alert_operator(notifier: &MailgunNotifier, config: &Config, error: &EngineError) {
    let body = format!("tally run failed: {error}");
    tracing::error!(error = %error, to = %config.operator_email, "run failed, alerting operator");
    if let Err(alert_err) = notifier.send(&config.operator_email, "tally exceptions", &body) {
        tracing::warn!(error = %alert_err, "operator alert delivery failed");
    }
}

fn print_report(report: &RunReport) {
    if report.weekend_skipped {
        println!("✓ {} is a weekend — nothing to check", report.date);
        return;
    }

    println!(
        "✓ {} reconciled ({} checked, {} already complete, {} missing, {} notified)",
        report.date, report.checked, report.already_complete, report.missing, report.notified
    );
    for failure in &report.failures {
        println!("  ✗  {} — {}", failure.name.red(), failure.error);
    }
}
