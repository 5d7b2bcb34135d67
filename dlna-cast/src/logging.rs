//! Tracing setup for applications embedding the control point
//!
//! The library crates only emit `tracing` events. Nothing is printed until
//! the application installs a subscriber, either its own or one of the
//! presets here.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Environment variable selecting the [`LoggingMode`]
pub const LOG_MODE_ENV: &str = "DLNA_CAST_LOG_MODE";

/// Environment variable overriding the filter directives
pub const LOG_LEVEL_ENV: &str = "DLNA_CAST_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber is installed
    Silent,
    /// Compact stderr output at `info`
    Development,
    /// Pretty output at `debug` with thread ids and source locations
    Debug,
}

impl LoggingMode {
    /// Mode named by `value`; anything unrecognized is `Silent`
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("development") => LoggingMode::Development,
            Some("debug") => LoggingMode::Debug,
            _ => LoggingMode::Silent,
        }
    }

    fn default_directives(&self) -> &'static str {
        match self {
            LoggingMode::Silent => "off",
            LoggingMode::Development => "info",
            LoggingMode::Debug => "debug",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid filter directives in {var}: {reason}")]
    InvalidFilter { var: &'static str, reason: String },
}

/// Install a global subscriber for `mode`
///
/// # Errors
/// Fails when a global subscriber is already set or the filter from the
/// environment does not parse.
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter(mode.default_directives())?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_writer(std::io::stderr)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter(mode.default_directives())?;

            Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Install a subscriber chosen by `DLNA_CAST_LOG_MODE`
///
/// `development` and `debug` select the matching mode; unset or anything
/// else stays silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = std::env::var(LOG_MODE_ENV).ok();
    init_logging(LoggingMode::from_env_value(mode.as_deref()))
}

/// `DLNA_CAST_LOG_LEVEL`, then `RUST_LOG`, then `default_directives`
fn create_env_filter(default_directives: &str) -> Result<EnvFilter, LoggingError> {
    for var in [LOG_LEVEL_ENV, "RUST_LOG"] {
        if let Ok(directives) = std::env::var(var) {
            return EnvFilter::try_new(&directives).map_err(|e| LoggingError::InvalidFilter {
                var,
                reason: e.to_string(),
            });
        }
    }

    Ok(EnvFilter::new(default_directives))
}

/// Whether a global subscriber has been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}
