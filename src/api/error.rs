//! API error type with the JSON failure envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::notify::NotifyError;

/// Failure envelope: `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Delivery failed: {0}")]
    Delivery(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail.clone()),
            // Delivery failures surface their cause so the scheduler's
            // logs show which provider rejected the send.
            ApiError::Delivery(detail) => {
                (StatusCode::INTERNAL_SERVER_ERROR, detail.clone())
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} not found: {id}"))
            }
            DatabaseError::InvalidEnum { field, value } => {
                ApiError::BadRequest(format!("Invalid {field}: {value}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<NotifyError> for ApiError {
    fn from(err: NotifyError) -> Self {
        ApiError::Delivery(err.to_string())
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use uuid::Uuid;

    #[tokio::test]
    async fn bad_request_returns_400_with_failure_envelope() {
        let response = ApiError::BadRequest("Invalid status: snoozed".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid status: snoozed");
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let response = ApiError::NotFound("DoseLog not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response = ApiError::Internal("disk I/O error".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "An internal error occurred");
    }

    #[tokio::test]
    async fn delivery_failures_keep_their_message() {
        let err: ApiError = NotifyError::MissingCredentials("Resend").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(
            json["error"],
            "Delivery failed: Resend credentials not configured"
        );
    }

    #[tokio::test]
    async fn database_not_found_maps_to_404() {
        let id = Uuid::new_v4();
        let err: ApiError = DatabaseError::NotFound {
            entity_type: "DoseLog".into(),
            id: id.to_string(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
