use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Medicine, SessionType};

fn medicine_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, Medicine)> {
    // Returns (id_str, user_id_str, medicine-with-nil-ids); ids parsed by caller.
    Ok((
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        Medicine {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            name: row.get(2)?,
            dosage: row.get(3)?,
            dosage_unit: row.get(4)?,
            instructions: row.get(5)?,
            start_date: row
                .get::<_, String>(6)?
                .parse::<NaiveDate>()
                .unwrap_or_default(),
            end_date: row
                .get::<_, Option<String>>(7)?
                .and_then(|s| s.parse::<NaiveDate>().ok()),
            stock_quantity: row.get(8)?,
            low_stock_threshold: row.get(9)?,
            is_active: row.get::<_, i64>(10)? != 0,
        },
    ))
}

fn finish(parts: (String, String, Medicine)) -> Result<Medicine, DatabaseError> {
    let (id_str, user_str, mut med) = parts;
    med.id = Uuid::parse_str(&id_str)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    med.user_id = Uuid::parse_str(&user_str)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    Ok(med)
}

const MEDICINE_COLUMNS: &str = "id, user_id, name, dosage, dosage_unit, instructions,
                                start_date, end_date, stock_quantity,
                                low_stock_threshold, is_active";

/// Insert a medicine.
pub fn insert_medicine(conn: &Connection, med: &Medicine) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medicines (id, user_id, name, dosage, dosage_unit,
                                instructions, start_date, end_date,
                                stock_quantity, low_stock_threshold, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            med.id.to_string(),
            med.user_id.to_string(),
            med.name,
            med.dosage,
            med.dosage_unit,
            med.instructions,
            med.start_date.to_string(),
            med.end_date.map(|d| d.to_string()),
            med.stock_quantity,
            med.low_stock_threshold,
            med.is_active as i64,
        ],
    )?;
    Ok(())
}

/// Fetch all active medicines, across all users. The stock monitor's
/// candidate set.
pub fn fetch_active_medicines(conn: &Connection) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines WHERE is_active = 1 ORDER BY name ASC"
    ))?;
    let rows = stmt
        .query_map([], medicine_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(finish).collect()
}

/// Fetch a single medicine by id.
pub fn fetch_medicine(conn: &Connection, id: &Uuid) -> Result<Option<Medicine>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = ?1"),
            params![id.to_string()],
            medicine_from_row,
        )
        .optional()?;
    row.map(finish).transpose()
}

/// Overwrite the remaining stock quantity.
pub fn set_stock(conn: &Connection, id: &Uuid, quantity: i64) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE medicines SET stock_quantity = ?1, updated_at = datetime('now')
         WHERE id = ?2",
        params![quantity, id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "medicine".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Add a medicine to a daily session. Idempotent via the uniqueness
/// constraint.
pub fn add_session(
    conn: &Connection,
    medicine_id: &Uuid,
    session: SessionType,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO medicine_sessions (id, medicine_id, session_type)
         VALUES (?1, ?2, ?3)",
        params![
            Uuid::new_v4().to_string(),
            medicine_id.to_string(),
            session.as_str(),
        ],
    )?;
    Ok(())
}

/// Sessions a medicine belongs to.
pub fn fetch_sessions(
    conn: &Connection,
    medicine_id: &Uuid,
) -> Result<Vec<SessionType>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT session_type FROM medicine_sessions
         WHERE medicine_id = ?1 ORDER BY session_type ASC",
    )?;
    let rows = stmt
        .query_map(params![medicine_id.to_string()], |row| {
            row.get::<_, String>(0)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    rows.iter().map(|s| s.parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::profile::upsert_profile;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Profile;

    fn test_medicine(user_id: Uuid, name: &str, stock: i64, threshold: i64) -> Medicine {
        Medicine {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            dosage: "500".into(),
            dosage_unit: "mg".into(),
            instructions: Some("With food".into()),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            stock_quantity: stock,
            low_stock_threshold: threshold,
            is_active: true,
        }
    }

    fn setup_user(conn: &Connection) -> Uuid {
        let id = Uuid::new_v4();
        upsert_profile(conn, &Profile::new(id, "Test Patient")).unwrap();
        id
    }

    #[test]
    fn insert_and_fetch_round_trip() {
        let conn = open_memory_database().unwrap();
        let user = setup_user(&conn);
        let med = test_medicine(user, "Metformin", 30, 10);
        insert_medicine(&conn, &med).unwrap();

        let fetched = fetch_medicine(&conn, &med.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Metformin");
        assert_eq!(fetched.user_id, user);
        assert_eq!(fetched.stock_quantity, 30);
        assert_eq!(fetched.instructions.as_deref(), Some("With food"));
        assert!(fetched.is_active);
    }

    #[test]
    fn active_medicines_excludes_inactive() {
        let conn = open_memory_database().unwrap();
        let user = setup_user(&conn);
        insert_medicine(&conn, &test_medicine(user, "Metformin", 30, 10)).unwrap();
        let mut inactive = test_medicine(user, "Old med", 5, 10);
        inactive.is_active = false;
        insert_medicine(&conn, &inactive).unwrap();

        let meds = fetch_active_medicines(&conn).unwrap();
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].name, "Metformin");
    }

    #[test]
    fn set_stock_updates_quantity() {
        let conn = open_memory_database().unwrap();
        let user = setup_user(&conn);
        let med = test_medicine(user, "Metformin", 30, 10);
        insert_medicine(&conn, &med).unwrap();

        set_stock(&conn, &med.id, 3).unwrap();
        let fetched = fetch_medicine(&conn, &med.id).unwrap().unwrap();
        assert_eq!(fetched.stock_quantity, 3);
        assert!(fetched.is_low_stock());
    }

    #[test]
    fn set_stock_unknown_medicine_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = set_stock(&conn, &Uuid::new_v4(), 1).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn session_membership_round_trip() {
        let conn = open_memory_database().unwrap();
        let user = setup_user(&conn);
        let med = test_medicine(user, "Metformin", 30, 10);
        insert_medicine(&conn, &med).unwrap();

        add_session(&conn, &med.id, SessionType::Morning).unwrap();
        add_session(&conn, &med.id, SessionType::Night).unwrap();
        // Re-adding is a no-op
        add_session(&conn, &med.id, SessionType::Morning).unwrap();

        let sessions = fetch_sessions(&conn, &med.id).unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions.contains(&SessionType::Morning));
        assert!(sessions.contains(&SessionType::Night));
    }
}
