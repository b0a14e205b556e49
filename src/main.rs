use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use carepill::api::{self, ApiContext};
use carepill::config::{self, AppConfig};
use carepill::db;
use carepill::notify::{EmailChannel, ResendClient, SmsChannel, TwilioClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("CarePill starting v{}", config::APP_VERSION);

    let config = AppConfig::from_env()?;

    if let Some(dir) = config.database_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let conn = db::open_database(&config.database_path)?;
    tracing::info!(path = %config.database_path.display(), "Database ready");

    let email: Option<Arc<dyn EmailChannel>> = match &config.resend {
        Some(resend) => Some(Arc::new(ResendClient::new(resend))),
        None => {
            tracing::warn!("RESEND_API_KEY not set; email delivery disabled");
            None
        }
    };
    let sms: Option<Arc<dyn SmsChannel>> = match &config.twilio {
        Some(twilio) => Some(Arc::new(TwilioClient::new(twilio))),
        None => {
            tracing::warn!("Twilio credentials not set; SMS delivery disabled");
            None
        }
    };

    let ctx = ApiContext::new(conn, email, sms);
    let mut server = api::server::start_server(ctx, config.bind_addr).await?;
    tracing::info!(addr = %server.addr, "Serving");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    server.shutdown();

    Ok(())
}
