use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::SessionType;

/// Stored wall-clock format for session times.
const TIME_FORMAT: &str = "%H:%M";

/// Set (or replace) the authoritative time for a (user, session) pair.
pub fn upsert_schedule(
    conn: &Connection,
    user_id: &Uuid,
    session: SessionType,
    time: NaiveTime,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO session_schedules (id, user_id, session_type, scheduled_time)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id, session_type) DO UPDATE SET
             scheduled_time = excluded.scheduled_time,
             updated_at = datetime('now')",
        params![
            Uuid::new_v4().to_string(),
            user_id.to_string(),
            session.as_str(),
            time.format(TIME_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// The scheduled time for a (user, session), if one is configured.
/// `None` means the detector never evaluates that session's doses.
pub fn fetch_schedule_time(
    conn: &Connection,
    user_id: &Uuid,
    session: SessionType,
) -> Result<Option<NaiveTime>, DatabaseError> {
    let time_str = conn
        .query_row(
            "SELECT scheduled_time FROM session_schedules
             WHERE user_id = ?1 AND session_type = ?2",
            params![user_id.to_string(), session.as_str()],
            |row| row.get::<_, String>(0),
        )
        .optional()?;

    // Accept HH:MM and HH:MM:SS; only the minute matters downstream.
    Ok(time_str.and_then(|s| {
        NaiveTime::parse_from_str(&s, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
            .ok()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::profile::upsert_profile;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Profile;

    #[test]
    fn upsert_and_fetch() {
        let conn = open_memory_database().unwrap();
        let user = Uuid::new_v4();
        upsert_profile(&conn, &Profile::new(user, "Pat")).unwrap();

        upsert_schedule(
            &conn,
            &user,
            SessionType::Morning,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        )
        .unwrap();

        let time = fetch_schedule_time(&conn, &user, SessionType::Morning)
            .unwrap()
            .unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
    }

    #[test]
    fn upsert_replaces_existing_time() {
        let conn = open_memory_database().unwrap();
        let user = Uuid::new_v4();
        upsert_profile(&conn, &Profile::new(user, "Pat")).unwrap();

        upsert_schedule(
            &conn,
            &user,
            SessionType::Night,
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        )
        .unwrap();
        upsert_schedule(
            &conn,
            &user,
            SessionType::Night,
            NaiveTime::from_hms_opt(21, 30, 0).unwrap(),
        )
        .unwrap();

        let time = fetch_schedule_time(&conn, &user, SessionType::Night)
            .unwrap()
            .unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(21, 30, 0).unwrap());

        // Exactly one row per (user, session)
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM session_schedules", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn unconfigured_session_is_none() {
        let conn = open_memory_database().unwrap();
        let user = Uuid::new_v4();
        upsert_profile(&conn, &Profile::new(user, "Pat")).unwrap();
        assert!(fetch_schedule_time(&conn, &user, SessionType::Afternoon)
            .unwrap()
            .is_none());
    }

    #[test]
    fn seconds_suffix_is_tolerated() {
        let conn = open_memory_database().unwrap();
        let user = Uuid::new_v4();
        upsert_profile(&conn, &Profile::new(user, "Pat")).unwrap();
        conn.execute(
            "INSERT INTO session_schedules (id, user_id, session_type, scheduled_time)
             VALUES (?1, ?2, 'morning', '08:15:00')",
            params![Uuid::new_v4().to_string(), user.to_string()],
        )
        .unwrap();

        let time = fetch_schedule_time(&conn, &user, SessionType::Morning)
            .unwrap()
            .unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(8, 15, 0).unwrap());
    }
}
