//! Repository functions. All operate on a borrowed `rusqlite::Connection`
//! and return `DatabaseError`; callers own transaction scope.

pub mod caregiver;
pub mod dose_log;
pub mod medicine;
pub mod notification_log;
pub mod profile;
pub mod schedule;
pub mod stock_alert;
