use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{AlertType, Channel, DeliveryStatus};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One delivery attempt's outcome. Append-only; audit and debugging only —
/// never consulted for dedup.
#[derive(Debug, Clone)]
pub struct NotificationRecord {
    pub user_id: Uuid,
    pub alert_type: AlertType,
    pub channel: Channel,
    pub recipient: String,
    pub message: String,
    pub status: DeliveryStatus,
    pub sent_at: NaiveDateTime,
}

impl NotificationRecord {
    /// Legacy compound type string, e.g. "email_missed_dose".
    pub fn notification_type(&self) -> String {
        format!("{}_{}", self.channel.as_str(), self.alert_type.as_str())
    }
}

/// Append a delivery outcome.
pub fn append(conn: &Connection, record: &NotificationRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notification_logs
             (id, user_id, notification_type, channel, recipient, message,
              status, sent_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            Uuid::new_v4().to_string(),
            record.user_id.to_string(),
            record.notification_type(),
            record.channel.as_str(),
            record.recipient,
            record.message,
            record.status.as_str(),
            record.sent_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// All delivery attempts for a patient, newest first.
pub fn fetch_for_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<NotificationRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT user_id, notification_type, channel, recipient, message,
                status, sent_at
         FROM notification_logs
         WHERE user_id = ?1
         ORDER BY sent_at DESC",
    )?;
    let rows = stmt
        .query_map(params![user_id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(user, ntype, channel, recipient, message, status, sent_at)| {
            // notification_type is "<channel>_<alert_type>"
            let channel: Channel = channel.parse()?;
            let alert_type = ntype
                .strip_prefix(channel.as_str())
                .and_then(|s| s.strip_prefix('_'))
                .unwrap_or(&ntype)
                .parse()?;
            Ok(NotificationRecord {
                user_id: Uuid::parse_str(&user)
                    .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
                alert_type,
                channel,
                recipient,
                message,
                status: status.parse()?,
                sent_at: NaiveDateTime::parse_from_str(&sent_at, TIMESTAMP_FORMAT)
                    .unwrap_or_default(),
            })
        })
        .collect()
}
