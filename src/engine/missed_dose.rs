//! Missed-dose detector.
//!
//! Firing-window design: a pending dose fires iff `minutes_passed` since
//! its session's scheduled time falls in `[THRESHOLD, THRESHOLD+WINDOW)`.
//! A run invoked less often than the window length silently skips doses
//! that became late between runs — correctness depends on invoking the
//! check at least once per window interval. Known fragility, kept as-is.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use rusqlite::Connection;

use super::{AlertRequest, CheckOutcome, NotificationDispatcher};
use crate::db::repository::{dose_log, profile, schedule};
use crate::db::DatabaseError;
use crate::models::{AlertType, DoseStatus};

/// Minutes after the scheduled time before a pending dose counts as missed.
pub const MISSED_DOSE_THRESHOLD_MINUTES: i64 = 5;
/// Width of the firing window that starts at the threshold.
pub const FIRING_WINDOW_MINUTES: i64 = 5;

fn minutes_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// One detector run at wall-clock `now`. Scans today's pending doses,
/// marks in-window ones missed, and fans out notifications.
pub fn run_missed_dose_check(
    conn: &Connection,
    dispatcher: &NotificationDispatcher,
    now: NaiveDateTime,
) -> Result<CheckOutcome, DatabaseError> {
    let today = now.date();
    let pending = dose_log::fetch_pending_for_date(conn, today)?;

    tracing::info!(candidates = pending.len(), %today, "Checking for missed doses");
    if pending.is_empty() {
        return Ok(CheckOutcome::default());
    }

    let now_minutes = minutes_since_midnight(now.time());
    let mut outcome = CheckOutcome::default();

    for dose in pending {
        // No schedule for this session: never evaluated.
        let Some(scheduled) =
            schedule::fetch_schedule_time(conn, &dose.log.user_id, dose.log.session_type)?
        else {
            continue;
        };

        // Plain same-day minute difference. Deliberately no midnight
        // wraparound: a 23:58 schedule checked at 00:03 yields a large
        // negative delta and never fires (legacy arithmetic, kept).
        let minutes_passed = now_minutes - minutes_since_midnight(scheduled);

        let window = MISSED_DOSE_THRESHOLD_MINUTES
            ..MISSED_DOSE_THRESHOLD_MINUTES + FIRING_WINDOW_MINUTES;
        if !window.contains(&minutes_passed) {
            continue;
        }

        // Missing profile: silent skip, dose stays pending.
        let Some(patient) = profile::fetch_profile(conn, &dose.log.user_id)? else {
            continue;
        };

        let request = AlertRequest {
            patient_id: dose.log.user_id,
            medicine_id: dose.log.medicine_id,
            medicine_name: dose.medicine_name.clone(),
            alert_type: AlertType::MissedDose,
            additional_info: Some(format!(
                "Session: {}, Scheduled: {}",
                dose.log.session_type.as_str(),
                scheduled.format("%H:%M"),
            )),
        };
        outcome.alerts_sent += dispatcher.dispatch(conn, &patient, &request, now)?;

        // Declared missed whether or not any recipient resolved.
        dose_log::set_status(conn, &dose.log.id, DoseStatus::Missed, now)?;
        outcome.flagged += 1;
        tracing::info!(
            dose = %dose.log.id,
            medicine = %dose.medicine_name,
            minutes_passed,
            "Dose marked missed"
        );
    }

    tracing::info!(alerts_sent = outcome.alerts_sent, doses_marked = outcome.flagged,
        "Missed-dose check complete");
    Ok(outcome)
}
