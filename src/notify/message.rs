//! Alert message templates, shared by both channels.

use crate::models::AlertType;

/// Email subject line for an alert.
pub fn email_subject(alert_type: AlertType, medicine_name: &str, patient_name: &str) -> String {
    match alert_type {
        AlertType::MissedDose => format!("Missed Dose Alert: {patient_name}"),
        AlertType::LowStock => format!("Low Stock Alert: {medicine_name}"),
    }
}

/// Email HTML body for an alert.
pub fn email_body(
    alert_type: AlertType,
    medicine_name: &str,
    patient_name: &str,
    additional_info: Option<&str>,
) -> String {
    let (headline, lead, detail_label, footer_line) = match alert_type {
        AlertType::MissedDose => (
            "Missed Dose Alert",
            format!("<strong>{patient_name}</strong> has missed their scheduled dose."),
            "Details",
            format!(
                "Please check on {patient_name} to ensure they take their medicine \
                 or if they need assistance."
            ),
        ),
        AlertType::LowStock => (
            "Low Stock Alert",
            format!("<strong>{patient_name}</strong>'s medicine supply is running low."),
            "Remaining Stock",
            format!(
                "Please arrange to refill {patient_name}'s prescription soon \
                 to avoid running out."
            ),
        ),
    };

    let detail = match additional_info {
        Some(info) => format!("<br><strong>{detail_label}:</strong> {info}"),
        None => String::new(),
    };

    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
           <h1>{headline}</h1>\
           <p>{lead}</p>\
           <p><strong>Medicine:</strong> {medicine_name}{detail}</p>\
           <p>{footer_line}</p>\
           <hr>\
           <p>This alert was sent by CarePill - Your Medicine Reminder Companion</p>\
         </div>"
    )
}

/// SMS body for an alert.
pub fn sms_body(
    alert_type: AlertType,
    medicine_name: &str,
    patient_name: &str,
    additional_info: Option<&str>,
) -> String {
    match alert_type {
        AlertType::MissedDose => format!(
            "CarePill Alert: {patient_name} missed their {medicine_name} dose. {}",
            additional_info.unwrap_or("Please check on them.")
        ),
        AlertType::LowStock => format!(
            "CarePill Alert: {patient_name}'s {medicine_name} is running low. {}",
            additional_info.unwrap_or("Please arrange a refill.")
        ),
    }
}
