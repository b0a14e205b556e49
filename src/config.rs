//! Application configuration.
//!
//! One explicit `AppConfig` is built from the environment in `main` and
//! passed down to the components that need it — no module-level globals.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "CarePill";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default log filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,carepill=debug".to_string()
}

/// Get the application data directory
/// ~/CarePill/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("CarePill")
}

/// Default database path: ~/CarePill/carepill.db
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("carepill.db")
}

/// Resend email credentials.
#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    /// Sender identity, e.g. "CarePill <onboarding@resend.dev>".
    pub from: String,
}

/// Twilio SMS credentials.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    /// Absent credentials mean the channel is not constructed; the direct
    /// delivery endpoints then fail with a structured 500.
    pub resend: Option<ResendConfig>,
    pub twilio: Option<TwilioConfig>,
}

impl AppConfig {
    /// Build configuration from the environment, falling back to defaults.
    ///
    /// Recognised variables: `CAREPILL_BIND_ADDR`, `CAREPILL_DB_PATH`,
    /// `RESEND_API_KEY`, `RESEND_FROM`, `TWILIO_ACCOUNT_SID`,
    /// `TWILIO_AUTH_TOKEN`, `TWILIO_PHONE_NUMBER`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = match std::env::var("CAREPILL_BIND_ADDR") {
            Ok(s) => s
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddr(s.clone()))?,
            Err(_) => SocketAddr::from(([127, 0, 0, 1], 8787)),
        };

        let database_path = std::env::var("CAREPILL_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        let resend = std::env::var("RESEND_API_KEY").ok().map(|api_key| ResendConfig {
            api_key,
            from: std::env::var("RESEND_FROM")
                .unwrap_or_else(|_| format!("{APP_NAME} <onboarding@resend.dev>")),
        });

        let twilio = match (
            std::env::var("TWILIO_ACCOUNT_SID"),
            std::env::var("TWILIO_AUTH_TOKEN"),
            std::env::var("TWILIO_PHONE_NUMBER"),
        ) {
            (Ok(account_sid), Ok(auth_token), Ok(from_number)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => None,
        };

        Ok(Self {
            bind_addr,
            database_path,
            resend,
            twilio,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind address: {0}")]
    InvalidBindAddr(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("CarePill"));
    }

    #[test]
    fn default_database_path_under_app_data() {
        let db = default_database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("carepill.db"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
