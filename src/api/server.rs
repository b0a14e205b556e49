//! Server lifecycle: bind → spawn background task → return handle with
//! shutdown channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Bind `bind_addr` and serve the router in a background tokio task.
/// Port 0 binds an ephemeral port; the resolved address is on the handle.
pub async fn start_server(
    ctx: ApiContext,
    bind_addr: SocketAddr,
) -> Result<ApiServer, std::io::Error> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "API server binding");

    let app = api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[tokio::test]
    async fn starts_on_ephemeral_port_and_shuts_down() {
        let conn = open_memory_database().unwrap();
        let ctx = ApiContext::new(conn, None, None);
        let mut server = start_server(ctx, "127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        assert_ne!(server.addr.port(), 0);
        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_twice_is_harmless() {
        let conn = open_memory_database().unwrap();
        let ctx = ApiContext::new(conn, None, None);
        let mut server = start_server(ctx, "127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        server.shutdown();
        server.shutdown();
    }
}
