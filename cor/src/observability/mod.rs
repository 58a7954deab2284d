//! Observability utilities.

mod logging;

pub use logging::{init_logging, LoggingConfig, DEFAULT_LOG_FILTER};
