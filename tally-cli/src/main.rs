//! Tally — daily working-hours reconciliation CLI.
//!
//! # Usage
//!
//! ```text
//! tally run [--date YYYY-MM-DD] [--config PATH]
//! tally users [--json]
//! ```
//!
//! `tally run` checks every registered user's logged hours for the target
//! date against the expected daily total and emails whoever falls short
//! (or over), at most once per day per user.

mod adapters;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{run::RunArgs, users::UsersArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version,
    about = "Reconcile logged working hours against the expected daily total",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run reconciliation for every registered user on a date.
    Run(RunArgs),

    /// List the registered users.
    Users(UsersArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Users(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
