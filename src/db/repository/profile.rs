use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Profile;

/// Insert or replace a profile row.
pub fn upsert_profile(conn: &Connection, profile: &Profile) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO profiles (user_id, full_name, email, age, gender,
                               health_condition, caregiver_name,
                               caregiver_email, caregiver_phone)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(user_id) DO UPDATE SET
             full_name = excluded.full_name,
             email = excluded.email,
             age = excluded.age,
             gender = excluded.gender,
             health_condition = excluded.health_condition,
             caregiver_name = excluded.caregiver_name,
             caregiver_email = excluded.caregiver_email,
             caregiver_phone = excluded.caregiver_phone,
             updated_at = datetime('now')",
        params![
            profile.user_id.to_string(),
            profile.full_name,
            profile.email,
            profile.age,
            profile.gender,
            profile.health_condition,
            profile.caregiver_name,
            profile.caregiver_email,
            profile.caregiver_phone,
        ],
    )?;
    Ok(())
}

/// Fetch a profile by user id. `None` when absent — callers in the engine
/// treat that as a silent skip, not an error.
pub fn fetch_profile(conn: &Connection, user_id: &Uuid) -> Result<Option<Profile>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT user_id, full_name, email, age, gender, health_condition,
                    caregiver_name, caregiver_email, caregiver_phone
             FROM profiles WHERE user_id = ?1",
            params![user_id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                    row.get::<_, Option<String>>(8)?,
                ))
            },
        )
        .optional()?;

    let Some((
        id_str,
        full_name,
        email,
        age,
        gender,
        health_condition,
        caregiver_name,
        caregiver_email,
        caregiver_phone,
    )) = row
    else {
        return Ok(None);
    };

    Ok(Some(Profile {
        user_id: Uuid::parse_str(&id_str)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        full_name,
        email,
        age,
        gender,
        health_condition,
        caregiver_name,
        caregiver_email,
        caregiver_phone,
    }))
}
