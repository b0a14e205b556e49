use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user profile. `email` is the account delivery address used when the
/// user appears as a linked caregiver. The `caregiver_*` fields are the
/// legacy contact route that predates caregiver links; the dispatcher
/// still honours them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub health_condition: Option<String>,
    pub caregiver_name: Option<String>,
    pub caregiver_email: Option<String>,
    pub caregiver_phone: Option<String>,
}

impl Profile {
    /// Minimal profile for inserts: name only.
    pub fn new(user_id: Uuid, full_name: impl Into<String>) -> Self {
        Self {
            user_id,
            full_name: full_name.into(),
            email: None,
            age: None,
            gender: None,
            health_condition: None,
            caregiver_name: None,
            caregiver_email: None,
            caregiver_phone: None,
        }
    }
}
