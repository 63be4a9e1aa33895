//! Utility modules shared by both binaries

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
