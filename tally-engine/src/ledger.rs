//! Ledger store — the append-only log of reconciliation outcomes and the
//! sole source of idempotency truth.
//!
//! Persists a `LedgerFile` JSON document at `<home>/.tally/ledger.json`.
//! Writes use an atomic `.tmp` + rename; entries are never mutated in place —
//! re-checking an unresolved day appends a new entry, and the most recent
//! entry for a (user, date) pair by insertion order is authoritative, exposed
//! via [`Ledger::latest_entry`].
//!
//! Operational assumption: one writer at a time. Non-overlapping runs never
//! leave the log inconsistent; overlapping concurrent runs are not defended
//! against internally.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use tally_core::types::{LedgerEntry, UserId};

use crate::error::{io_err, EngineError};

/// On-disk ledger payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerFile {
    pub updated_at: DateTime<Utc>,
    pub entries: Vec<LedgerEntry>,
}

/// Path to the ledger JSON, rooted at `home`.
///
/// `~/.tally/ledger.json`
pub fn ledger_path_at(home: &Path) -> PathBuf {
    home.join(".tally").join("ledger.json")
}

/// An open handle on the ledger: in-memory view plus durable append.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    file: LedgerFile,
}

impl Ledger {
    /// Open the ledger for `home`, loading existing entries.
    ///
    /// A missing file yields an empty ledger.
    pub fn open_at(home: &Path) -> Result<Self, EngineError> {
        let path = ledger_path_at(home);
        let file = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            serde_json::from_str(&contents)?
        } else {
            LedgerFile {
                updated_at: Utc::now(),
                entries: Vec::new(),
            }
        };
        Ok(Self { path, file })
    }

    /// Most recent entry for a (user, date) pair, or `None`.
    ///
    /// "Most recent" is insertion order, newest last — the authoritative-entry
    /// rule made explicit.
    pub fn latest_entry(&self, user_id: UserId, date: NaiveDate) -> Option<&LedgerEntry> {
        self.file
            .entries
            .iter()
            .rev()
            .find(|e| e.user_id == user_id && e.check_date == date)
    }

    /// Append an entry and persist it durably before returning.
    ///
    /// Prior rows are never rewritten.
    pub fn append(&mut self, entry: LedgerEntry) -> Result<(), EngineError> {
        self.file.entries.push(entry);
        self.file.updated_at = Utc::now();
        self.save()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.file.entries
    }

    /// Atomic save: serialize → `<path>.tmp` → rename.
    fn save(&self) -> Result<(), EngineError> {
        let Some(dir) = self.path.parent() else {
            return Err(io_err(
                &self.path,
                std::io::Error::other("invalid ledger path"),
            ));
        };
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

        let json = serde_json::to_string_pretty(&self.file)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| io_err(&self.path, e))?;
        Ok(())
    }
}
