//! Outbound delivery channels: email (Resend) and SMS (Twilio).
//!
//! The engine talks to these through the `EmailChannel`/`SmsChannel`
//! traits so the dispatcher is testable with recording fakes. Channels
//! are fire-and-forget from the dispatcher's perspective: a failure is
//! logged and not retried within the run.

pub mod message;
pub mod resend;
pub mod twilio;

pub use resend::ResendClient;
pub use twilio::TwilioClient;

use thiserror::Error;

use crate::models::AlertType;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("{0} credentials not configured")]
    MissingCredentials(&'static str),

    #[error("Cannot reach {service} at {url}")]
    Connection { service: &'static str, url: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("{service} API error (status {status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to parse delivery response: {0}")]
    ResponseParsing(String),
}

/// An email alert about a patient, addressed to one caregiver.
#[derive(Debug, Clone)]
pub struct AlertEmail {
    pub recipient: String,
    pub alert_type: AlertType,
    pub medicine_name: String,
    pub patient_name: String,
    /// Context line: "Session: morning, Scheduled: 08:00" or "3 remaining".
    pub additional_info: Option<String>,
}

/// An SMS alert about a patient, addressed to one caregiver phone.
#[derive(Debug, Clone)]
pub struct AlertSms {
    pub recipient_phone: String,
    pub alert_type: AlertType,
    pub medicine_name: String,
    pub patient_name: String,
    pub additional_info: Option<String>,
}

/// Email delivery contract. Returns a provider delivery id on success.
pub trait EmailChannel: Send + Sync {
    fn send_alert(&self, email: &AlertEmail) -> Result<String, NotifyError>;
}

/// SMS delivery contract. Returns a provider message SID on success.
pub trait SmsChannel: Send + Sync {
    fn send_alert(&self, sms: &AlertSms) -> Result<String, NotifyError>;
}
