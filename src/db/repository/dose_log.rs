use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{DoseLog, DoseStatus, PendingDose, SessionType};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Materialise pending dose logs for every active medicine×session
/// membership of a user on the given date. Idempotent: existing rows are
/// left untouched via the (medicine, session, date) uniqueness constraint.
/// Returns the number of rows created.
pub fn ensure_dose_logs(
    conn: &Connection,
    user_id: &Uuid,
    date: NaiveDate,
) -> Result<u32, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT m.id, ms.session_type
         FROM medicines m
         INNER JOIN medicine_sessions ms ON ms.medicine_id = m.id
         WHERE m.user_id = ?1 AND m.is_active = 1",
    )?;
    let memberships = stmt
        .query_map(params![user_id.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut created = 0u32;
    for (medicine_id, session_type) in memberships {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO dose_logs
                 (id, user_id, medicine_id, session_type, scheduled_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                Uuid::new_v4().to_string(),
                user_id.to_string(),
                medicine_id,
                session_type,
                date.to_string(),
            ],
        )?;
        created += inserted as u32;
    }
    Ok(created)
}

/// All pending doses for a date, joined with their medicine name.
/// The missed-dose detector's candidate set.
pub fn fetch_pending_for_date(
    conn: &Connection,
    date: NaiveDate,
) -> Result<Vec<PendingDose>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT d.id, d.user_id, d.medicine_id, d.session_type,
                d.scheduled_date, d.status, d.taken_at, d.notes, m.name
         FROM dose_logs d
         INNER JOIN medicines m ON d.medicine_id = m.id
         WHERE d.scheduled_date = ?1 AND d.status = 'pending'
         ORDER BY d.session_type ASC, m.name ASC",
    )?;
    let rows = stmt
        .query_map(params![date.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, user, med, session, sched, status, taken_at, notes, name)| {
            Ok(PendingDose {
                log: DoseLog {
                    id: parse_uuid(&id)?,
                    user_id: parse_uuid(&user)?,
                    medicine_id: parse_uuid(&med)?,
                    session_type: session.parse()?,
                    scheduled_date: sched.parse().unwrap_or_default(),
                    status: status.parse()?,
                    taken_at: taken_at
                        .and_then(|s| NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).ok()),
                    notes,
                },
                medicine_name: name,
            })
        })
        .collect()
}

/// Fetch one dose log by id.
pub fn fetch_dose_log(conn: &Connection, id: &Uuid) -> Result<Option<DoseLog>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, user_id, medicine_id, session_type, scheduled_date,
                    status, taken_at, notes
             FROM dose_logs WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                ))
            },
        )
        .optional()?;

    let Some((id, user, med, session, sched, status, taken_at, notes)) = row else {
        return Ok(None);
    };
    Ok(Some(DoseLog {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user)?,
        medicine_id: parse_uuid(&med)?,
        session_type: session.parse()?,
        scheduled_date: sched.parse().unwrap_or_default(),
        status: status.parse()?,
        taken_at: taken_at.and_then(|s| NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).ok()),
        notes,
    }))
}

/// Set a dose's status. `taken_at` is written iff the new status is
/// `taken`, otherwise cleared. The log is mutable: a patient may overwrite
/// `missed`/`skipped` with `taken` later, so no transition is rejected here.
pub fn set_status(
    conn: &Connection,
    id: &Uuid,
    status: DoseStatus,
    now: NaiveDateTime,
) -> Result<(), DatabaseError> {
    let taken_at = match status {
        DoseStatus::Taken => Some(now.format(TIMESTAMP_FORMAT).to_string()),
        _ => None,
    };
    let updated = conn.execute(
        "UPDATE dose_logs SET status = ?1, taken_at = ?2, updated_at = datetime('now')
         WHERE id = ?3",
        params![status.as_str(), taken_at, id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "dose_log".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Counts of today's doses by status, for dashboards.
pub fn status_counts(
    conn: &Connection,
    user_id: &Uuid,
    date: NaiveDate,
) -> Result<(u32, u32, u32, u32), DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM dose_logs
         WHERE user_id = ?1 AND scheduled_date = ?2
         GROUP BY status",
    )?;
    let rows = stmt
        .query_map(params![user_id.to_string(), date.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let (mut pending, mut taken, mut missed, mut skipped) = (0, 0, 0, 0);
    for (status, count) in rows {
        match status.parse::<DoseStatus>()? {
            DoseStatus::Pending => pending = count,
            DoseStatus::Taken => taken = count,
            DoseStatus::Missed => missed = count,
            DoseStatus::Skipped => skipped = count,
        }
    }
    Ok((pending, taken, missed, skipped))
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
