//! Route table.
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the service router. All routes live under `/api/`.
pub fn api_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/checks/missed-doses",
            post(endpoints::checks::missed_doses),
        )
        .route("/checks/low-stock", post(endpoints::checks::low_stock))
        .route("/alerts/email", post(endpoints::alerts::send_email))
        .route("/alerts/sms", post(endpoints::alerts::send_sms))
        .route("/doses/:id/status", post(endpoints::doses::set_status))
        .route(
            "/caregivers/invitations",
            post(endpoints::caregivers::create_invitation),
        )
        .route(
            "/caregivers/invitations/accept",
            post(endpoints::caregivers::accept_invitation),
        )
        .route(
            "/patients/:id/caregivers",
            get(endpoints::caregivers::list_caregivers),
        )
        .route(
            "/caregivers/:id/patients",
            get(endpoints::caregivers::list_patients),
        )
        .with_state(ctx);

    Router::new().nest("/api", api)
}
