//! Twilio SMS client.

use serde::Deserialize;

use super::message;
use super::{AlertSms, NotifyError, SmsChannel};
use crate::config::TwilioConfig;

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// HTTP client for the Twilio Messages API.
pub struct TwilioClient {
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
    client: reqwest::blocking::Client,
}

impl TwilioClient {
    pub fn new(config: &TwilioConfig) -> Self {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Point the client at a different base URL (tests).
    pub fn with_base_url(config: &TwilioConfig, base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            client,
        }
    }
}

/// Response body from POST Messages.json
#[derive(Deserialize)]
struct SendSmsResponse {
    sid: String,
}

#[derive(Deserialize)]
struct TwilioErrorResponse {
    message: Option<String>,
}

impl SmsChannel for TwilioClient {
    fn send_alert(&self, sms: &AlertSms) -> Result<String, NotifyError> {
        let body_text = message::sms_body(
            sms.alert_type,
            &sms.medicine_name,
            &sms.patient_name,
            sms.additional_info.as_deref(),
        );

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        let form = [
            ("To", sms.recipient_phone.as_str()),
            ("From", self.from_number.as_str()),
            ("Body", body_text.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    NotifyError::Connection {
                        service: "Twilio",
                        url: self.base_url.clone(),
                    }
                } else {
                    NotifyError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let detail = serde_json::from_str::<TwilioErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(NotifyError::Api {
                service: "Twilio",
                status: status.as_u16(),
                body: detail,
            });
        }

        let parsed: SendSmsResponse = response
            .json()
            .map_err(|e| NotifyError::ResponseParsing(e.to_string()))?;

        Ok(parsed.sid)
    }
}
