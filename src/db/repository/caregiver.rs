use base64::Engine;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{CaregiverLink, LinkStatus, LinkedParty};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Generate a random URL-safe invitation token (32 bytes of entropy).
pub fn generate_invitation_token() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Create a pending link carrying a fresh invitation token. The caregiver
/// is unidentified until the token is claimed.
pub fn create_invitation(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<CaregiverLink, DatabaseError> {
    let link = CaregiverLink {
        id: Uuid::new_v4(),
        patient_id: *patient_id,
        caregiver_id: None,
        invitation_token: Some(generate_invitation_token()),
        status: LinkStatus::Pending,
        accepted_at: None,
    };
    conn.execute(
        "INSERT INTO caregiver_links (id, patient_id, caregiver_id,
                                      invitation_token, status)
         VALUES (?1, ?2, NULL, ?3, ?4)",
        params![
            link.id.to_string(),
            link.patient_id.to_string(),
            link.invitation_token,
            link.status.as_str(),
        ],
    )?;
    Ok(link)
}

/// Claim an invitation token. Transitions pending → accepted exactly once:
/// the update is conditional on the token still being attached to a pending
/// row, and the token is nulled in the same statement. A second accept of
/// the same token fails with `NotFound`.
pub fn accept_invitation(
    conn: &Connection,
    token: &str,
    caregiver_id: &Uuid,
    now: NaiveDateTime,
) -> Result<CaregiverLink, DatabaseError> {
    let link_id: Option<String> = conn
        .query_row(
            "SELECT id FROM caregiver_links
             WHERE invitation_token = ?1 AND status = 'pending'",
            params![token],
            |row| row.get(0),
        )
        .optional()?;
    let Some(link_id) = link_id else {
        return Err(DatabaseError::NotFound {
            entity_type: "caregiver_link invitation".into(),
            id: token.into(),
        });
    };

    // Conditional on status so a concurrent accept cannot fire twice.
    let updated = conn.execute(
        "UPDATE caregiver_links
         SET caregiver_id = ?1, status = 'accepted', accepted_at = ?2,
             invitation_token = NULL
         WHERE id = ?3 AND status = 'pending'",
        params![
            caregiver_id.to_string(),
            now.format(TIMESTAMP_FORMAT).to_string(),
            link_id,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "caregiver_link invitation".into(),
            id: token.into(),
        });
    }

    let link = conn.query_row(
        "SELECT id, patient_id, caregiver_id, invitation_token, status, accepted_at
         FROM caregiver_links WHERE id = ?1",
        params![link_id],
        link_from_row,
    )?;
    finish(link)
}

/// Delete a link (invitation rejected, or caregiver removed).
pub fn remove_link(conn: &Connection, link_id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM caregiver_links WHERE id = ?1",
        params![link_id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "caregiver_link".into(),
            id: link_id.to_string(),
        });
    }
    Ok(())
}

/// Accepted caregivers for a patient, with their profile identity.
/// Caregivers without a profile row are omitted (the dispatcher cannot
/// resolve a delivery address for them anyway).
pub fn accepted_caregivers(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<LinkedParty>, DatabaseError> {
    linked_parties(
        conn,
        "SELECT l.id, p.user_id, p.full_name, p.email
         FROM caregiver_links l
         INNER JOIN profiles p ON p.user_id = l.caregiver_id
         WHERE l.patient_id = ?1 AND l.status = 'accepted'
         ORDER BY p.full_name ASC",
        patient_id,
    )
}

/// Patients a caregiver monitors.
pub fn accepted_patients(
    conn: &Connection,
    caregiver_id: &Uuid,
) -> Result<Vec<LinkedParty>, DatabaseError> {
    linked_parties(
        conn,
        "SELECT l.id, p.user_id, p.full_name, p.email
         FROM caregiver_links l
         INNER JOIN profiles p ON p.user_id = l.patient_id
         WHERE l.caregiver_id = ?1 AND l.status = 'accepted'
         ORDER BY p.full_name ASC",
        caregiver_id,
    )
}

fn linked_parties(
    conn: &Connection,
    sql: &str,
    id: &Uuid,
) -> Result<Vec<LinkedParty>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(link_id, user_id, full_name, email)| {
            Ok(LinkedParty {
                link_id: parse_uuid(&link_id)?,
                user_id: parse_uuid(&user_id)?,
                full_name,
                email,
            })
        })
        .collect()
}

/// Look up a link by its invitation token (for the accept-invite screen).
pub fn fetch_link_by_token(
    conn: &Connection,
    token: &str,
) -> Result<Option<CaregiverLink>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_id, caregiver_id, invitation_token, status, accepted_at
             FROM caregiver_links WHERE invitation_token = ?1",
            params![token],
            link_from_row,
        )
        .optional()?;
    row.map(finish).transpose()
}

type LinkRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
);

fn link_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LinkRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn finish(row: LinkRow) -> Result<CaregiverLink, DatabaseError> {
    let (id, patient, caregiver, token, status, accepted_at) = row;
    Ok(CaregiverLink {
        id: parse_uuid(&id)?,
        patient_id: parse_uuid(&patient)?,
        caregiver_id: caregiver.as_deref().map(parse_uuid).transpose()?,
        invitation_token: token,
        status: status.parse()?,
        accepted_at: accepted_at
            .and_then(|s| NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).ok()),
    })
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
