//! HTTP client for the time-tracking source.
//!
//! Queries `POST <server>/tms/working_hours` with the configured credentials
//! plus the target (email, date), and maps the JSON rows into
//! [`HoursEntry`] values. An empty row set is a valid answer — a day with
//! nothing logged.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use tally_core::config::TmsConfig;
use tally_core::types::HoursEntry;
use tally_engine::adapters::{AdapterError, HoursSource};

const SERVICE: &str = "tms";
const TIMEOUT: Duration = Duration::from_secs(30);

/// One row on the wire.
#[derive(Debug, Deserialize)]
struct WireEntry {
    #[serde(default)]
    user: Option<String>,
    date: NaiveDate,
    duration_hour: f64,
}

/// `HoursSource` over the configured HTTP endpoint.
pub struct HttpHoursSource {
    server: String,
    database: String,
    username: String,
    password: String,
    agent: ureq::Agent,
}

impl HttpHoursSource {
    pub fn new(config: &TmsConfig) -> Self {
        Self {
            server: config.server.trim_end_matches('/').to_owned(),
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            agent: ureq::AgentBuilder::new().timeout(TIMEOUT).build(),
        }
    }
}

impl HoursSource for HttpHoursSource {
    fn working_hours(&self, email: &str, date: NaiveDate) -> Result<Vec<HoursEntry>, AdapterError> {
        let url = format!("{}/tms/working_hours", self.server);
        tracing::debug!(%url, %email, %date, "querying working hours");

        let response = self
            .agent
            .post(&url)
            .send_json(serde_json::json!({
                "database": self.database,
                "login": self.username,
                "password": self.password,
                "email": email,
                "date": date.to_string(),
            }))
            .map_err(|e| match e {
                ureq::Error::Status(status, _) => AdapterError::Http {
                    service: SERVICE,
                    status,
                },
                other => AdapterError::Transport {
                    service: SERVICE,
                    reason: other.to_string(),
                },
            })?;

        let rows: Vec<WireEntry> = response.into_json().map_err(|e| AdapterError::Decode {
            service: SERVICE,
            reason: e.to_string(),
        })?;

        Ok(rows
            .into_iter()
            .map(|row| HoursEntry {
                email: row.user.unwrap_or_else(|| email.to_owned()),
                date: row.date,
                duration_hours: row.duration_hour,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_rows_deserialize_with_and_without_user() {
        let rows: Vec<WireEntry> = serde_json::from_str(
            r#"[
                {"user": "alice@example.com", "date": "2024-03-04", "duration_hour": 4.0},
                {"date": "2024-03-04", "duration_hour": 2.5}
            ]"#,
        )
        .expect("deserialize");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user.as_deref(), Some("alice@example.com"));
        assert!(rows[1].user.is_none());
        assert_eq!(rows[1].duration_hour, 2.5);
    }

    #[test]
    fn trailing_slash_in_server_is_normalised() {
        let source = HttpHoursSource::new(&TmsConfig {
            server: "https://tms.example.com/".into(),
            database: "tms".into(),
            username: "bot".into(),
            password: "secret".into(),
        });
        assert_eq!(source.server, "https://tms.example.com");
    }
}
