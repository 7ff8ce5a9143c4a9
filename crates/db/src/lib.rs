//! Database layer for the polling-center locator.
//!
//! Provides SQLite storage for polling centers, state polling hours, parties,
//! users and comments, with embedded migrations.

pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod pool;
pub mod repository;

pub use config::DbConfig;
pub use error::{DbError, DbResult};
pub use models::{Comment, Party, PollingCenter, PollingHour, User};
pub use pool::DbPool;
