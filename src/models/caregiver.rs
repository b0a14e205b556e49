use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::LinkStatus;

/// Relation authorizing a caregiver to monitor a patient's adherence.
///
/// Created as `pending` with an invitation token; a not-yet-identified
/// caregiver claims the link once, which sets `caregiver_id`, flips the
/// status to `accepted` and nulls the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaregiverLink {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub caregiver_id: Option<Uuid>,
    pub invitation_token: Option<String>,
    pub status: LinkStatus,
    pub accepted_at: Option<NaiveDateTime>,
}

/// An accepted link resolved to the counterpart's profile, for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedParty {
    pub link_id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
}
