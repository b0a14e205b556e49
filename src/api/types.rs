//! Shared state for the API router.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::engine::NotificationDispatcher;
use crate::notify::{EmailChannel, SmsChannel};

/// Shared context for all API routes: the database handle, the delivery
/// channels, and the dispatcher built over them. The connection is behind
/// a mutex — SQLite access is serialised, which also keeps check runs on
/// the blocking pool from interleaving writes.
#[derive(Clone)]
pub struct ApiContext {
    db: Arc<Mutex<Connection>>,
    pub email: Option<Arc<dyn EmailChannel>>,
    pub sms: Option<Arc<dyn SmsChannel>>,
    pub dispatcher: Arc<NotificationDispatcher>,
}

impl ApiContext {
    pub fn new(
        conn: Connection,
        email: Option<Arc<dyn EmailChannel>>,
        sms: Option<Arc<dyn SmsChannel>>,
    ) -> Self {
        let dispatcher = Arc::new(NotificationDispatcher::new(email.clone(), sms.clone()));
        Self {
            db: Arc::new(Mutex::new(conn)),
            email,
            sms,
            dispatcher,
        }
    }

    /// Lock the database connection. A poisoned lock is an internal error.
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))
    }
}
