//! Check endpoints — the entry points an external scheduler invokes.
//!
//! The engine is synchronous (rusqlite + blocking delivery clients), so
//! each run goes through `tokio::task::spawn_blocking`.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::engine::{self, CheckOutcome};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub success: bool,
    pub alerts_sent: u32,
}

/// `POST /api/checks/missed-doses` — one missed-dose detector run.
pub async fn missed_doses(
    State(ctx): State<ApiContext>,
) -> Result<Json<CheckResponse>, ApiError> {
    run_check(ctx, |conn, dispatcher, now| {
        engine::run_missed_dose_check(conn, dispatcher, now)
    })
    .await
}

/// `POST /api/checks/low-stock` — one stock monitor run.
pub async fn low_stock(
    State(ctx): State<ApiContext>,
) -> Result<Json<CheckResponse>, ApiError> {
    run_check(ctx, |conn, dispatcher, now| {
        engine::run_low_stock_check(conn, dispatcher, now)
    })
    .await
}

async fn run_check<F>(ctx: ApiContext, check: F) -> Result<Json<CheckResponse>, ApiError>
where
    F: FnOnce(
            &rusqlite::Connection,
            &engine::NotificationDispatcher,
            chrono::NaiveDateTime,
        ) -> Result<CheckOutcome, crate::db::DatabaseError>
        + Send
        + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || {
        let conn = ctx.db()?;
        let now = chrono::Local::now().naive_local();
        check(&conn, &ctx.dispatcher, now).map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("check task panicked: {e}")))??;

    Ok(Json(CheckResponse {
        success: true,
        alerts_sent: outcome.alerts_sent,
    }))
}
