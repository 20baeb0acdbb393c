//! Mailgun-style transactional email notifier.
//!
//! Sends `POST <domain>/messages` with HTTP basic auth (`api:<key>`) and
//! form fields from/to/subject/text. Only HTTP 200 counts as delivered; one
//! attempt per call, no retries.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use tally_core::config::MailgunConfig;
use tally_engine::adapters::{AdapterError, Notifier};

const SERVICE: &str = "mailgun";
const TIMEOUT: Duration = Duration::from_secs(30);

/// `Notifier` over the configured mail endpoint.
pub struct MailgunNotifier {
    domain: String,
    from_email: String,
    auth_header: String,
    agent: ureq::Agent,
}

impl MailgunNotifier {
    pub fn new(config: &MailgunConfig) -> Self {
        let auth_header = format!(
            "Basic {}",
            STANDARD.encode(format!("api:{}", config.api_key))
        );
        Self {
            domain: config.domain.trim_end_matches('/').to_owned(),
            from_email: config.from_email.clone(),
            auth_header,
            agent: ureq::AgentBuilder::new().timeout(TIMEOUT).build(),
        }
    }
}

impl Notifier for MailgunNotifier {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AdapterError> {
        let url = format!("{}/messages", self.domain);
        tracing::debug!(%url, %to, "sending email");

        let response = self
            .agent
            .post(&url)
            .set("Authorization", &self.auth_header)
            .send_form(&[
                ("from", self.from_email.as_str()),
                ("to", to),
                ("subject", subject),
                ("text", body),
            ])
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

        if response.status() == 200 {
            Ok(())
        } else {
            Err(AdapterError::Http {
                service: SERVICE,
                status: response.status(),
            })
        }
    }
}
