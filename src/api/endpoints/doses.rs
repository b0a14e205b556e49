//! Dose status endpoint.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::dose_log;
use crate::models::{DoseLog, DoseStatus};

#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct SetStatusResponse {
    pub success: bool,
    pub dose: DoseLog,
}

/// `POST /api/doses/:id/status` — record or correct a dose outcome.
///
/// Any transition between statuses is allowed: a patient may flip a
/// mistaken `skipped` back to `taken`, or re-open to `pending`.
/// `taken_at` is stamped only for `taken` and cleared otherwise.
pub async fn set_status(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<SetStatusResponse>, ApiError> {
    let status = DoseStatus::from_str(&request.status)
        .map_err(|_| ApiError::BadRequest(format!("Invalid status: {}", request.status)))?;

    let conn = ctx.db()?;
    let now = chrono::Local::now().naive_local();
    dose_log::set_status(&conn, &id, status, now)?;

    let dose = dose_log::fetch_dose_log(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("DoseLog not found: {id}")))?;

    Ok(Json(SetStatusResponse {
        success: true,
        dose,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{medicine, profile};
    use crate::db::sqlite::open_memory_database;
    use crate::models::{Medicine, Profile, SessionType};
    use chrono::NaiveDate;

    fn seed_pending_dose(ctx: &ApiContext) -> Uuid {
        let conn = ctx.db().unwrap();
        let user = Uuid::new_v4();
        profile::upsert_profile(&conn, &Profile::new(user, "Ana Silva")).unwrap();
        let med = Medicine {
            id: Uuid::new_v4(),
            user_id: user,
            name: "Metformin".into(),
            dosage: "500".into(),
            dosage_unit: "mg".into(),
            instructions: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            stock_quantity: 30,
            low_stock_threshold: 10,
            is_active: true,
        };
        medicine::insert_medicine(&conn, &med).unwrap();
        medicine::add_session(&conn, &med.id, SessionType::Morning).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        dose_log::ensure_dose_logs(&conn, &user, date).unwrap();
        dose_log::fetch_pending_for_date(&conn, date).unwrap()[0].log.id
    }

    #[tokio::test]
    async fn marks_a_dose_taken() {
        let ctx = ApiContext::new(open_memory_database().unwrap(), None, None);
        let id = seed_pending_dose(&ctx);

        let Json(response) = set_status(
            State(ctx),
            Path(id),
            Json(SetStatusRequest {
                status: "taken".into(),
            }),
        )
        .await
        .unwrap();

        assert!(response.success);
        assert_eq!(response.dose.status, DoseStatus::Taken);
        assert!(response.dose.taken_at.is_some());
    }

    #[tokio::test]
    async fn invalid_status_is_rejected() {
        let ctx = ApiContext::new(open_memory_database().unwrap(), None, None);
        let id = seed_pending_dose(&ctx);

        let err = set_status(
            State(ctx),
            Path(id),
            Json(SetStatusRequest {
                status: "snoozed".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unknown_dose_is_a_404() {
        let ctx = ApiContext::new(open_memory_database().unwrap(), None, None);

        let err = set_status(
            State(ctx),
            Path(Uuid::new_v4()),
            Json(SetStatusRequest {
                status: "taken".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
