use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;

/// Alert type recorded when caregivers are notified about low stock.
/// The dedup key is (medicine, alert_type, calendar day).
pub const LOW_STOCK_CAREGIVER: &str = "low_stock_caregiver";

/// Whether an alert of this type was already recorded for the medicine on
/// the given calendar day.
pub fn has_alert_on(
    conn: &Connection,
    medicine_id: &Uuid,
    alert_type: &str,
    day: NaiveDate,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM stock_alerts
         WHERE medicine_id = ?1 AND alert_type = ?2 AND date(created_at) = ?3",
        params![medicine_id.to_string(), alert_type, day.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Record an alert so later runs on the same day skip the medicine.
pub fn insert_alert(
    conn: &Connection,
    medicine_id: &Uuid,
    user_id: &Uuid,
    alert_type: &str,
    now: NaiveDateTime,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO stock_alerts (id, medicine_id, user_id, alert_type, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            Uuid::new_v4().to_string(),
            medicine_id.to_string(),
            user_id.to_string(),
            alert_type,
            now.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}
