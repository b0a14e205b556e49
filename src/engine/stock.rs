//! Low-stock monitor.
//!
//! Scans every active medicine, alerts caregivers when the remaining
//! quantity is at or under the medicine's own threshold, and records a
//! `stock_alerts` row that suppresses re-alerting for the rest of the
//! calendar day. The alert row lands whether or not any delivery
//! succeeded, so a medicine is surfaced at most once per day.

use chrono::NaiveDateTime;
use rusqlite::Connection;

use super::{AlertRequest, CheckOutcome, NotificationDispatcher};
use crate::db::repository::{medicine, profile, stock_alert};
use crate::db::repository::stock_alert::LOW_STOCK_CAREGIVER;
use crate::db::DatabaseError;
use crate::models::AlertType;

/// One monitor run at wall-clock `now`.
pub fn run_low_stock_check(
    conn: &Connection,
    dispatcher: &NotificationDispatcher,
    now: NaiveDateTime,
) -> Result<CheckOutcome, DatabaseError> {
    let medicines = medicine::fetch_active_medicines(conn)?;
    tracing::info!(candidates = medicines.len(), "Checking stock levels");

    let today = now.date();
    let mut outcome = CheckOutcome::default();

    for med in medicines {
        if !med.is_low_stock() {
            continue;
        }
        if stock_alert::has_alert_on(conn, &med.id, LOW_STOCK_CAREGIVER, today)? {
            tracing::debug!(medicine = %med.name, "Already alerted today; skipping");
            continue;
        }
        // Missing profile: silent skip, no alert row either.
        let Some(patient) = profile::fetch_profile(conn, &med.user_id)? else {
            continue;
        };

        let request = AlertRequest {
            patient_id: med.user_id,
            medicine_id: med.id,
            medicine_name: med.name.clone(),
            alert_type: AlertType::LowStock,
            additional_info: Some(format!("{} remaining", med.stock_quantity)),
        };
        outcome.alerts_sent += dispatcher.dispatch(conn, &patient, &request, now)?;

        // Recorded regardless of delivery outcome: one surfacing per day.
        stock_alert::insert_alert(conn, &med.id, &med.user_id, LOW_STOCK_CAREGIVER, now)?;
        outcome.flagged += 1;
        tracing::info!(
            medicine = %med.name,
            stock = med.stock_quantity,
            threshold = med.low_stock_threshold,
            "Low-stock alert recorded"
        );
    }

    tracing::info!(alerts_sent = outcome.alerts_sent, medicines_flagged = outcome.flagged,
        "Low-stock check complete");
    Ok(outcome)
}
