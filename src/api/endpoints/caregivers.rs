//! Caregiver link endpoints: invite, accept, and accepted-link listings.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::caregiver;
use crate::db::DatabaseError;
use crate::models::{CaregiverLink, LinkedParty};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationRequest {
    pub patient_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationResponse {
    pub success: bool,
    pub link_id: Uuid,
    pub invitation_token: String,
}

/// `POST /api/caregivers/invitations` — mint a single-use invitation token.
pub async fn create_invitation(
    State(ctx): State<ApiContext>,
    Json(request): Json<CreateInvitationRequest>,
) -> Result<Json<CreateInvitationResponse>, ApiError> {
    let conn = ctx.db()?;
    let link = caregiver::create_invitation(&conn, &request.patient_id)?;

    // Token is always present on a freshly minted invitation.
    let token = link
        .invitation_token
        .ok_or_else(|| ApiError::Internal("invitation minted without token".into()))?;

    tracing::info!(link = %link.id, patient = %link.patient_id, "Caregiver invitation created");
    Ok(Json(CreateInvitationResponse {
        success: true,
        link_id: link.id,
        invitation_token: token,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationRequest {
    pub token: String,
    pub caregiver_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationResponse {
    pub success: bool,
    pub link: CaregiverLink,
}

/// `POST /api/caregivers/invitations/accept` — claim a token. A spent or
/// unknown token is a 404; the token cannot be claimed twice.
pub async fn accept_invitation(
    State(ctx): State<ApiContext>,
    Json(request): Json<AcceptInvitationRequest>,
) -> Result<Json<AcceptInvitationResponse>, ApiError> {
    let conn = ctx.db()?;
    let now = chrono::Local::now().naive_local();
    let link =
        caregiver::accept_invitation(&conn, &request.token, &request.caregiver_id, now).map_err(
            |e| match e {
                DatabaseError::NotFound { .. } => {
                    ApiError::NotFound("Invitation not found or already accepted".into())
                }
                other => ApiError::from(other),
            },
        )?;

    tracing::info!(link = %link.id, caregiver = %request.caregiver_id, "Caregiver link accepted");
    Ok(Json(AcceptInvitationResponse {
        success: true,
        link,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedPartiesResponse {
    pub success: bool,
    pub parties: Vec<LinkedParty>,
}

/// `GET /api/patients/:id/caregivers` — accepted caregivers of a patient.
pub async fn list_caregivers(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<LinkedPartiesResponse>, ApiError> {
    let conn = ctx.db()?;
    let parties = caregiver::accepted_caregivers(&conn, &patient_id)?;
    Ok(Json(LinkedPartiesResponse {
        success: true,
        parties,
    }))
}

/// `GET /api/caregivers/:id/patients` — accepted patients of a caregiver.
pub async fn list_patients(
    State(ctx): State<ApiContext>,
    Path(caregiver_id): Path<Uuid>,
) -> Result<Json<LinkedPartiesResponse>, ApiError> {
    let conn = ctx.db()?;
    let parties = caregiver::accepted_patients(&conn, &caregiver_id)?;
    Ok(Json(LinkedPartiesResponse {
        success: true,
        parties,
    }))
}
