//! Adherence & alerting rule engine.
//!
//! Invoked per run by the check endpoints (an external scheduler triggers
//! them); each run processes its full candidate set sequentially and
//! exits. Runs are assumed non-overlapping by operational convention —
//! there is no advisory lock between concurrent runs.

pub mod dispatch;
pub mod missed_dose;
pub mod stock;

pub use dispatch::{AlertRequest, NotificationDispatcher};
pub use missed_dose::run_missed_dose_check;
pub use stock::run_low_stock_check;

/// What one check run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Successful deliveries across all recipients.
    pub alerts_sent: u32,
    /// Doses marked missed, or stock alerts recorded, this run.
    pub flagged: u32,
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording channel fakes for engine tests.

    use std::sync::Mutex;

    use crate::notify::{AlertEmail, AlertSms, EmailChannel, NotifyError, SmsChannel};

    #[derive(Default)]
    pub struct RecordingEmail {
        pub sent: Mutex<Vec<AlertEmail>>,
    }

    impl EmailChannel for RecordingEmail {
        fn send_alert(&self, email: &AlertEmail) -> Result<String, NotifyError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(format!("email-{}", self.sent.lock().unwrap().len()))
        }
    }

    #[derive(Default)]
    pub struct RecordingSms {
        pub sent: Mutex<Vec<AlertSms>>,
    }

    impl SmsChannel for RecordingSms {
        fn send_alert(&self, sms: &AlertSms) -> Result<String, NotifyError> {
            self.sent.lock().unwrap().push(sms.clone());
            Ok(format!("sms-{}", self.sent.lock().unwrap().len()))
        }
    }

    /// Email channel that fails for one recipient and records the rest.
    pub struct PartiallyFailingEmail {
        pub failing_recipient: String,
        pub sent: Mutex<Vec<AlertEmail>>,
    }

    impl EmailChannel for PartiallyFailingEmail {
        fn send_alert(&self, email: &AlertEmail) -> Result<String, NotifyError> {
            if email.recipient == self.failing_recipient {
                return Err(NotifyError::Api {
                    service: "Resend",
                    status: 500,
                    body: "boom".into(),
                });
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok("email-ok".into())
        }
    }
}
