//! Structured logging setup for the tcci binaries
//!
//! Both binaries log through `tracing`; this module owns the subscriber
//! setup. Logs always go to stderr so that `ci-transcribe` can keep stdout
//! for the transcript itself.
//!
//! # Example
//!
//! ```no_run
//! use tcci::util::logging;
//! use tracing::Level;
//!
//! logging::init_logging(logging::LoggingConfig::with_level(Level::DEBUG));
//! tracing::info!("ready");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the default log level
pub const LOG_LEVEL_ENV: &str = "TCCI_LOG_LEVEL";

/// Environment variable enabling JSON log output
pub const LOG_JSON_ENV: &str = "TCCI_LOG_JSON";

static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format (for log shippers on the build agents)
    pub use_json: bool,

    /// Include the module target (e.g., tcci::tcbuild::locator) in logs
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Resolves the level from CLI input, falling back to the environment.
    ///
    /// Precedence: explicit `--log-level`, then `--debug`, then
    /// `TCCI_LOG_LEVEL`, then INFO. `TCCI_LOG_JSON=true` switches to JSON.
    pub fn from_args(log_level: Option<&str>, debug: bool) -> Self {
        let level = if let Some(level_str) = log_level {
            parse_level(level_str)
        } else if debug {
            Level::DEBUG
        } else {
            let level_str = env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
            parse_level(&level_str)
        };

        let use_json = env::var(LOG_JSON_ENV)
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            ..Default::default()
        }
    }
}

/// Parses a log level from a string, case-insensitive. Unknown values fall
/// back to INFO with a note on stderr.
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber. Only the first call has an effect.
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(config.level.to_string())
        };

        let registry = tracing_subscriber::registry().with(filter);

        if config.use_json {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}
