//! Direct delivery endpoints.
//!
//! One email or SMS to one caregiver, bypassing recipient resolution.
//! Every attempt lands in notification_logs, failures included.

use std::str::FromStr;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::notification_log::{self, NotificationRecord};
use crate::models::{AlertType, Channel, DeliveryStatus};
use crate::notify::{message, AlertEmail, AlertSms, NotifyError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub patient_id: Uuid,
    pub caregiver_email: String,
    pub alert_type: String,
    pub medicine_name: String,
    pub patient_name: String,
    pub additional_info: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success: bool,
    pub email_id: String,
}

/// `POST /api/alerts/email` — send one caregiver email.
pub async fn send_email(
    State(ctx): State<ApiContext>,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let alert_type = parse_alert_type(&request.alert_type)?;

    let email_id = tokio::task::spawn_blocking(move || {
        let channel = ctx
            .email
            .clone()
            .ok_or(NotifyError::MissingCredentials("Resend"))?;

        let alert = AlertEmail {
            recipient: request.caregiver_email.clone(),
            alert_type,
            medicine_name: request.medicine_name.clone(),
            patient_name: request.patient_name.clone(),
            additional_info: request.additional_info.clone(),
        };
        let subject =
            message::email_subject(alert_type, &request.medicine_name, &request.patient_name);

        let outcome = channel.send_alert(&alert);
        let status = if outcome.is_ok() {
            DeliveryStatus::Sent
        } else {
            DeliveryStatus::Failed
        };

        let conn = ctx.db()?;
        notification_log::append(
            &conn,
            &NotificationRecord {
                user_id: request.patient_id,
                alert_type,
                channel: Channel::Email,
                recipient: request.caregiver_email,
                message: subject,
                status,
                sent_at: chrono::Local::now().naive_local(),
            },
        )?;

        outcome.map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("delivery task panicked: {e}")))??;

    Ok(Json(SendEmailResponse {
        success: true,
        email_id,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsRequest {
    pub patient_id: Uuid,
    pub caregiver_phone: String,
    pub alert_type: String,
    pub medicine_name: String,
    pub patient_name: String,
    pub additional_info: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsResponse {
    pub success: bool,
    pub message_sid: String,
}

/// `POST /api/alerts/sms` — send one caregiver SMS.
pub async fn send_sms(
    State(ctx): State<ApiContext>,
    Json(request): Json<SendSmsRequest>,
) -> Result<Json<SendSmsResponse>, ApiError> {
    let alert_type = parse_alert_type(&request.alert_type)?;

    let message_sid = tokio::task::spawn_blocking(move || {
        let channel = ctx
            .sms
            .clone()
            .ok_or(NotifyError::MissingCredentials("Twilio"))?;

        let alert = AlertSms {
            recipient_phone: request.caregiver_phone.clone(),
            alert_type,
            medicine_name: request.medicine_name.clone(),
            patient_name: request.patient_name.clone(),
            additional_info: request.additional_info.clone(),
        };
        let body = message::sms_body(
            alert_type,
            &request.medicine_name,
            &request.patient_name,
            request.additional_info.as_deref(),
        );

        let outcome = channel.send_alert(&alert);
        let status = if outcome.is_ok() {
            DeliveryStatus::Sent
        } else {
            DeliveryStatus::Failed
        };

        let conn = ctx.db()?;
        notification_log::append(
            &conn,
            &NotificationRecord {
                user_id: request.patient_id,
                alert_type,
                channel: Channel::Sms,
                recipient: request.caregiver_phone,
                message: body,
                status,
                sent_at: chrono::Local::now().naive_local(),
            },
        )?;

        outcome.map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("delivery task panicked: {e}")))??;

    Ok(Json(SendSmsResponse {
        success: true,
        message_sid,
    }))
}

fn parse_alert_type(raw: &str) -> Result<AlertType, ApiError> {
    AlertType::from_str(raw)
        .map_err(|_| ApiError::BadRequest(format!("Invalid alertType: {raw}")))
}
