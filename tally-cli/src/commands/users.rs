//! `tally users` — registry visibility.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use tally_core::registry;
use tally_core::types::User;

/// Arguments for `tally users`.
#[derive(Args, Debug)]
pub struct UsersArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl UsersArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let users = registry::load_or_seed_at(&home)
            .context("failed to load user registry — place a users.csv under ~/.tally to seed")?;

        if self.json {
            print_json(&users)?;
            return Ok(());
        }

        print_table(&users);
        Ok(())
    }
}

#[derive(Serialize)]
struct UserJson {
    id: u64,
    name: String,
    email: String,
    notify_email: Option<String>,
    phone: Option<String>,
}

#[derive(Tabled)]
struct UserTableRow {
    #[tabled(rename = "id")]
    id: u64,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "email")]
    email: String,
    #[tabled(rename = "notify email")]
    notify_email: String,
    #[tabled(rename = "phone")]
    phone: String,
}

fn print_json(users: &[User]) -> Result<()> {
    let rows: Vec<UserJson> = users
        .iter()
        .map(|u| UserJson {
            id: u.id.0,
            name: u.name.clone(),
            email: u.email.clone(),
            notify_email: u.notify_email.clone(),
            phone: u.phone.clone(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn print_table(users: &[User]) {
    if users.is_empty() {
        println!("No users registered.");
        return;
    }

    let rows: Vec<UserTableRow> = users
        .iter()
        .map(|u| UserTableRow {
            id: u.id.0,
            name: u.name.clone(),
            email: u.email.clone(),
            notify_email: u.notify_email.clone().unwrap_or_else(|| "—".into()),
            phone: u.phone.clone().unwrap_or_else(|| "—".into()),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("{} user(s) registered", users.len().to_string().bold());
}
