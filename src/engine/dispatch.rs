//! Notification dispatcher: recipient resolution and per-recipient
//! delivery with failure isolation.
//!
//! Recipients, in order, each an independent delivery attempt:
//! 1. every accepted caregiver link, resolved to the caregiver's account
//!    email;
//! 2. the legacy `caregiver_email`/`caregiver_phone` fields on the
//!    patient's profile.
//! Both fire regardless of the other. A failing recipient is logged and
//! never aborts the batch; every attempt's outcome lands in
//! notification_logs.

use std::sync::Arc;

use chrono::NaiveDateTime;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{caregiver, notification_log};
use crate::db::repository::notification_log::NotificationRecord;
use crate::db::DatabaseError;
use crate::models::{AlertType, Channel, DeliveryStatus, Profile};
use crate::notify::{message, AlertEmail, AlertSms, EmailChannel, SmsChannel};

/// One alert to fan out to a patient's caregivers.
#[derive(Debug, Clone)]
pub struct AlertRequest {
    pub patient_id: Uuid,
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub alert_type: AlertType,
    /// Context line: "Session: morning, Scheduled: 08:00" or "3 remaining".
    pub additional_info: Option<String>,
}

/// Resolves recipients and drives the delivery channels.
/// A channel left unconfigured means that route is skipped with a warning.
pub struct NotificationDispatcher {
    email: Option<Arc<dyn EmailChannel>>,
    sms: Option<Arc<dyn SmsChannel>>,
}

impl NotificationDispatcher {
    pub fn new(
        email: Option<Arc<dyn EmailChannel>>,
        sms: Option<Arc<dyn SmsChannel>>,
    ) -> Self {
        Self { email, sms }
    }

    /// No channels at all. Recipient resolution and record-keeping still
    /// run; deliveries count zero.
    pub fn disabled() -> Self {
        Self {
            email: None,
            sms: None,
        }
    }

    /// Fan one alert out to all resolved recipients. Returns the number of
    /// successful deliveries. Only database failures propagate; delivery
    /// failures are recorded and swallowed.
    pub fn dispatch(
        &self,
        conn: &Connection,
        patient: &Profile,
        request: &AlertRequest,
        now: NaiveDateTime,
    ) -> Result<u32, DatabaseError> {
        let mut delivered = 0;

        // 1. Linked caregivers → account email.
        for linked in caregiver::accepted_caregivers(conn, &patient.user_id)? {
            let Some(address) = linked.email else {
                tracing::debug!(
                    caregiver = %linked.user_id,
                    "Linked caregiver has no account email; skipping"
                );
                continue;
            };
            delivered += self.deliver_email(conn, patient, request, &address, now)?;
        }

        // 2. Legacy contact fields — independent of step 1.
        if let Some(address) = patient.caregiver_email.clone() {
            delivered += self.deliver_email(conn, patient, request, &address, now)?;
        }
        if let Some(phone) = patient.caregiver_phone.clone() {
            delivered += self.deliver_sms(conn, patient, request, &phone, now)?;
        }

        Ok(delivered)
    }

    fn deliver_email(
        &self,
        conn: &Connection,
        patient: &Profile,
        request: &AlertRequest,
        recipient: &str,
        now: NaiveDateTime,
    ) -> Result<u32, DatabaseError> {
        let Some(channel) = &self.email else {
            tracing::warn!("Email channel not configured; skipping email delivery");
            return Ok(0);
        };

        let alert = AlertEmail {
            recipient: recipient.to_string(),
            alert_type: request.alert_type,
            medicine_name: request.medicine_name.clone(),
            patient_name: patient.full_name.clone(),
            additional_info: request.additional_info.clone(),
        };
        let subject = message::email_subject(
            request.alert_type,
            &request.medicine_name,
            &patient.full_name,
        );

        match channel.send_alert(&alert) {
            Ok(delivery_id) => {
                tracing::info!(%recipient, %delivery_id, "Email alert sent");
                self.record(conn, request, Channel::Email, recipient, &subject,
                            DeliveryStatus::Sent, now)?;
                Ok(1)
            }
            Err(e) => {
                tracing::warn!(%recipient, error = %e, "Failed to send email alert");
                self.record(conn, request, Channel::Email, recipient, &subject,
                            DeliveryStatus::Failed, now)?;
                Ok(0)
            }
        }
    }

    fn deliver_sms(
        &self,
        conn: &Connection,
        patient: &Profile,
        request: &AlertRequest,
        recipient: &str,
        now: NaiveDateTime,
    ) -> Result<u32, DatabaseError> {
        let Some(channel) = &self.sms else {
            tracing::warn!("SMS channel not configured; skipping SMS delivery");
            return Ok(0);
        };

        let alert = AlertSms {
            recipient_phone: recipient.to_string(),
            alert_type: request.alert_type,
            medicine_name: request.medicine_name.clone(),
            patient_name: patient.full_name.clone(),
            additional_info: request.additional_info.clone(),
        };
        let body = message::sms_body(
            request.alert_type,
            &request.medicine_name,
            &patient.full_name,
            request.additional_info.as_deref(),
        );

        match channel.send_alert(&alert) {
            Ok(sid) => {
                tracing::info!(%recipient, %sid, "SMS alert sent");
                self.record(conn, request, Channel::Sms, recipient, &body,
                            DeliveryStatus::Sent, now)?;
                Ok(1)
            }
            Err(e) => {
                tracing::warn!(%recipient, error = %e, "Failed to send SMS alert");
                self.record(conn, request, Channel::Sms, recipient, &body,
                            DeliveryStatus::Failed, now)?;
                Ok(0)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        conn: &Connection,
        request: &AlertRequest,
        channel: Channel,
        recipient: &str,
        message: &str,
        status: DeliveryStatus,
        now: NaiveDateTime,
    ) -> Result<(), DatabaseError> {
        notification_log::append(
            conn,
            &NotificationRecord {
                user_id: request.patient_id,
                alert_type: request.alert_type,
                channel,
                recipient: recipient.to_string(),
                message: message.to_string(),
                status,
                sent_at: now,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{caregiver, notification_log, profile};
    use crate::db::sqlite::open_memory_database;
    use crate::engine::testing::{PartiallyFailingEmail, RecordingEmail, RecordingSms};
    use crate::models::Profile;
    use std::sync::Mutex;

    fn now() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(8, 7, 0)
            .unwrap()
    }

    fn request(patient_id: Uuid) -> AlertRequest {
        AlertRequest {
            patient_id,
            medicine_id: Uuid::new_v4(),
            medicine_name: "Metformin".into(),
            alert_type: AlertType::MissedDose,
            additional_info: Some("Session: morning, Scheduled: 08:00".into()),
        }
    }

    fn patient_with_legacy(conn: &Connection, email: Option<&str>, phone: Option<&str>) -> Profile {
        let mut p = Profile::new(Uuid::new_v4(), "Ana Silva");
        p.caregiver_email = email.map(String::from);
        p.caregiver_phone = phone.map(String::from);
        profile::upsert_profile(conn, &p).unwrap();
        p
    }

    fn linked_caregiver(conn: &Connection, patient: &Profile, email: Option<&str>) -> Uuid {
        let caregiver_id = Uuid::new_v4();
        let mut cg = Profile::new(caregiver_id, "Cara");
        cg.email = email.map(String::from);
        profile::upsert_profile(conn, &cg).unwrap();
        let link = caregiver::create_invitation(conn, &patient.user_id).unwrap();
        caregiver::accept_invitation(conn, &link.invitation_token.unwrap(), &caregiver_id, now())
            .unwrap();
        caregiver_id
    }

    #[test]
    fn linked_and_legacy_both_fire() {
        let conn = open_memory_database().unwrap();
        let patient = patient_with_legacy(&conn, Some("son@example.com"), Some("+15550001111"));
        linked_caregiver(&conn, &patient, Some("cara@example.com"));

        let email = Arc::new(RecordingEmail::default());
        let sms = Arc::new(RecordingSms::default());
        let dispatcher =
            NotificationDispatcher::new(Some(email.clone()), Some(sms.clone()));

        let delivered = dispatcher
            .dispatch(&conn, &patient, &request(patient.user_id), now())
            .unwrap();

        assert_eq!(delivered, 3);
        let emails = email.sent.lock().unwrap();
        assert_eq!(emails.len(), 2);
        assert!(emails.iter().any(|e| e.recipient == "cara@example.com"));
        assert!(emails.iter().any(|e| e.recipient == "son@example.com"));
        assert_eq!(sms.sent.lock().unwrap()[0].recipient_phone, "+15550001111");
    }

    #[test]
    fn failing_recipient_does_not_abort_batch() {
        let conn = open_memory_database().unwrap();
        let patient = patient_with_legacy(&conn, Some("son@example.com"), None);
        linked_caregiver(&conn, &patient, Some("cara@example.com"));

        let email = Arc::new(PartiallyFailingEmail {
            failing_recipient: "cara@example.com".into(),
            sent: Mutex::new(Vec::new()),
        });
        let dispatcher = NotificationDispatcher::new(Some(email.clone()), None);

        let delivered = dispatcher
            .dispatch(&conn, &patient, &request(patient.user_id), now())
            .unwrap();

        // Legacy email still went out despite the linked one failing
        assert_eq!(delivered, 1);
        assert_eq!(email.sent.lock().unwrap()[0].recipient, "son@example.com");

        // Both outcomes were recorded
        let records = notification_log::fetch_for_user(&conn, &patient.user_id).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.status == DeliveryStatus::Failed
            && r.recipient == "cara@example.com"));
        assert!(records.iter().any(|r| r.status == DeliveryStatus::Sent
            && r.recipient == "son@example.com"));
    }

    #[test]
    fn caregiver_without_account_email_is_skipped() {
        let conn = open_memory_database().unwrap();
        let patient = patient_with_legacy(&conn, None, None);
        linked_caregiver(&conn, &patient, None);

        let email = Arc::new(RecordingEmail::default());
        let dispatcher = NotificationDispatcher::new(Some(email.clone()), None);

        let delivered = dispatcher
            .dispatch(&conn, &patient, &request(patient.user_id), now())
            .unwrap();
        assert_eq!(delivered, 0);
        assert!(email.sent.lock().unwrap().is_empty());
        assert!(notification_log::fetch_for_user(&conn, &patient.user_id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn unconfigured_channels_deliver_nothing() {
        let conn = open_memory_database().unwrap();
        let patient = patient_with_legacy(&conn, Some("son@example.com"), Some("+15550001111"));

        let dispatcher = NotificationDispatcher::disabled();
        let delivered = dispatcher
            .dispatch(&conn, &patient, &request(patient.user_id), now())
            .unwrap();
        assert_eq!(delivered, 0);
    }

    #[test]
    fn no_recipients_resolves_to_zero() {
        let conn = open_memory_database().unwrap();
        let patient = patient_with_legacy(&conn, None, None);

        let email = Arc::new(RecordingEmail::default());
        let dispatcher = NotificationDispatcher::new(Some(email), None);
        let delivered = dispatcher
            .dispatch(&conn, &patient, &request(patient.user_id), now())
            .unwrap();
        assert_eq!(delivered, 0);
    }

    #[test]
    fn email_message_is_the_subject_line() {
        let conn = open_memory_database().unwrap();
        let patient = patient_with_legacy(&conn, Some("son@example.com"), None);

        let dispatcher =
            NotificationDispatcher::new(Some(Arc::new(RecordingEmail::default())), None);
        dispatcher
            .dispatch(&conn, &patient, &request(patient.user_id), now())
            .unwrap();

        let records = notification_log::fetch_for_user(&conn, &patient.user_id).unwrap();
        assert_eq!(records[0].message, "Missed Dose Alert: Ana Silva");
    }
}
