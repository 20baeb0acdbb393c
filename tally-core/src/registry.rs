//! User registry — the durable list of people to check.
//!
//! # Storage layout
//!
//! ```text
//! ~/.tally/
//!   config.yaml   (runtime configuration — see [`crate::config`])
//!   users.yaml    (the registry — mode 0600, written atomically)
//!   users.csv     (one-time bootstrap seed, header-described)
//!   ledger.json   (owned by tally-engine)
//! ```
//!
//! # API pattern
//!
//! Every function touching the filesystem has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.
//!
//! # Bootstrap
//!
//! If `users.yaml` is absent, [`load_or_seed_at`] imports `users.csv` once,
//! assigns sequential ids, and persists the registry. Subsequent loads read
//! the YAML only — the CSV is never consulted again.

use std::path::{Path, PathBuf};

use crate::error::RegistryError;
use crate::types::{User, UserId};

/// Seed column order is not fixed; the header row names the columns.
const KNOWN_COLUMNS: [&str; 4] = ["name", "email", "notify_email", "phone"];

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.tally/`
///
/// Creates the directory (mode `0700`) if it does not yet exist.
pub fn tally_dir_at(home: &Path) -> Result<PathBuf, RegistryError> {
    let dir = home.join(".tally");
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

/// `<home>/.tally/users.yaml` — pure, no I/O.
pub fn users_path_at(home: &Path) -> PathBuf {
    home.join(".tally").join("users.yaml")
}

/// `<home>/.tally/users.csv` — pure, no I/O.
pub fn seed_path_at(home: &Path) -> PathBuf {
    home.join(".tally").join("users.csv")
}

// ---------------------------------------------------------------------------
// 2. Load / seed
// ---------------------------------------------------------------------------

/// Load the registry, seeding it from `users.csv` if it does not exist yet.
///
/// Returns `RegistryError::SeedNotFound` when both the registry and the seed
/// file are absent. The seed import is one-time: once `users.yaml` exists it
/// is the only source consulted.
pub fn load_or_seed_at(home: &Path) -> Result<Vec<User>, RegistryError> {
    let path = users_path_at(home);
    if path.exists() {
        let contents = std::fs::read_to_string(&path)?;
        return serde_yaml::from_str(&contents).map_err(|e| RegistryError::Parse {
            path,
            source: e,
        });
    }

    let seed_path = seed_path_at(home);
    if !seed_path.exists() {
        return Err(RegistryError::SeedNotFound { path: seed_path });
    }
    let users = import_seed(&seed_path)?;
    save_users_at(home, &users)?;
    Ok(users)
}

/// `load_or_seed_at` convenience wrapper.
pub fn load_or_seed() -> Result<Vec<User>, RegistryError> {
    load_or_seed_at(&home()?)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save the registry to `<home>/.tally/users.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// `.tmp` is always in the same directory as the target.
pub fn save_users_at(home: &Path, users: &[User]) -> Result<(), RegistryError> {
    tally_dir_at(home)?; // create dir + 0700 if absent
    let path = users_path_at(home);
    let tmp_path = path.with_file_name("users.yaml.tmp");

    let yaml = serde_yaml::to_string(users)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// `save_users_at` convenience wrapper.
pub fn save_users(users: &[User]) -> Result<(), RegistryError> {
    save_users_at(&home()?, users)
}

// ---------------------------------------------------------------------------
// 4. Seed import
// ---------------------------------------------------------------------------

/// Parse the header-described seed CSV into users with sequential ids.
///
/// Rows whose contact triple (email, notify_email, phone) duplicates an
/// earlier row are skipped; rows with the wrong field count fail the import.
fn import_seed(path: &Path) -> Result<Vec<User>, RegistryError> {
    let contents = std::fs::read_to_string(path)?;
    let mut lines = contents.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((n, line)) => break parse_header(path, n + 1, line)?,
            None => return Ok(vec![]),
        }
    };

    let mut users: Vec<User> = Vec::new();
    let mut next_id: u64 = 1;
    for (n, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != header.len() {
            return Err(RegistryError::SeedRow {
                path: path.to_path_buf(),
                line: n + 1,
                reason: format!(
                    "expected {} fields, found {}",
                    header.len(),
                    fields.len()
                ),
            });
        }

        let field = |name: &str| -> Option<String> {
            header
                .iter()
                .position(|h| h.as_str() == name)
                .map(|i| fields[i].to_owned())
                .filter(|v| !v.is_empty())
        };

        let Some(email) = field("email") else {
            return Err(RegistryError::SeedRow {
                path: path.to_path_buf(),
                line: n + 1,
                reason: "email is required".into(),
            });
        };
        let user = User {
            id: UserId(next_id),
            name: field("name").unwrap_or_default(),
            email,
            notify_email: field("notify_email"),
            phone: field("phone"),
        };

        // Contact-triple uniqueness: duplicate registrations are skipped.
        let duplicate = users.iter().any(|u| {
            u.email == user.email
                && u.notify_email == user.notify_email
                && u.phone == user.phone
        });
        if duplicate {
            continue;
        }

        users.push(user);
        next_id += 1;
    }
    Ok(users)
}

fn parse_header(path: &Path, line_no: usize, line: &str) -> Result<Vec<String>, RegistryError> {
    let columns: Vec<String> = line.split(',').map(|c| c.trim().to_owned()).collect();
    for column in &columns {
        if !KNOWN_COLUMNS.contains(&column.as_str()) {
            return Err(RegistryError::SeedRow {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("unknown column '{column}'"),
            });
        }
    }
    Ok(columns)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, RegistryError> {
    dirs::home_dir().ok_or(RegistryError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), RegistryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), RegistryError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), RegistryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), RegistryError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
