//! Observability setup for the polling-center locator.

pub mod logging;

pub use logging::{init_logging, LogFormat};
