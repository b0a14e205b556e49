//! Resend email client (https://resend.com).

use serde::{Deserialize, Serialize};

use super::message;
use super::{AlertEmail, EmailChannel, NotifyError};
use crate::config::ResendConfig;

const DEFAULT_BASE_URL: &str = "https://api.resend.com";
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// HTTP client for the Resend transactional email API.
pub struct ResendClient {
    base_url: String,
    api_key: String,
    from: String,
    client: reqwest::blocking::Client,
}

impl ResendClient {
    pub fn new(config: &ResendConfig) -> Self {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Point the client at a different base URL (tests).
    pub fn with_base_url(config: &ResendConfig, base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
            client,
        }
    }
}

/// Request body for POST /emails
#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

/// Response body from POST /emails
#[derive(Deserialize)]
struct SendEmailResponse {
    id: String,
}

impl EmailChannel for ResendClient {
    fn send_alert(&self, email: &AlertEmail) -> Result<String, NotifyError> {
        let subject = message::email_subject(
            email.alert_type,
            &email.medicine_name,
            &email.patient_name,
        );
        let html = message::email_body(
            email.alert_type,
            &email.medicine_name,
            &email.patient_name,
            email.additional_info.as_deref(),
        );

        let url = format!("{}/emails", self.base_url);
        let body = SendEmailRequest {
            from: &self.from,
            to: vec![&email.recipient],
            subject: &subject,
            html: &html,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    NotifyError::Connection {
                        service: "Resend",
                        url: self.base_url.clone(),
                    }
                } else {
                    NotifyError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NotifyError::Api {
                service: "Resend",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SendEmailResponse = response
            .json()
            .map_err(|e| NotifyError::ResponseParsing(e.to_string()))?;

        Ok(parsed.id)
    }
}
