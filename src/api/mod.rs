//! HTTP surface for the adherence service.
//!
//! Routes are nested under `/api/`. Check endpoints are the entry points
//! an external scheduler (cron) invokes; alert endpoints expose the
//! delivery channels directly. The router is composable —
//! `api_router()` returns a `Router` that can be mounted on any axum
//! server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::ApiServer;
pub use types::ApiContext;
