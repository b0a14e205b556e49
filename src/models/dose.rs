use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{DoseStatus, SessionType};

/// One adherence record: did this medicine get taken in this session on
/// this calendar date. Unique per (medicine, session, date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub medicine_id: Uuid,
    pub session_type: SessionType,
    pub scheduled_date: NaiveDate,
    pub status: DoseStatus,
    /// Set iff status is `taken`.
    pub taken_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

/// A pending dose joined with its medicine, as the missed-dose detector
/// consumes it.
#[derive(Debug, Clone)]
pub struct PendingDose {
    pub log: DoseLog,
    pub medicine_name: String,
}
