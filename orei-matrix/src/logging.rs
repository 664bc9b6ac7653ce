//! Logging setup for matrix applications
//!
//! Libraries in this workspace only emit `tracing` events; binaries pick how
//! those are rendered by calling one of the initializers here once at start.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Environment variable selecting the logging mode
pub const LOG_MODE_ENV: &str = "OREI_LOG_MODE";

/// Environment variable overriding the log filter
pub const LOG_LEVEL_ENV: &str = "OREI_LOG_LEVEL";

/// How log events are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber is installed
    Silent,
    /// Compact stderr output at `info`
    Development,
    /// Pretty output with thread ids and source locations at `debug`
    Debug,
}

impl LoggingMode {
    /// Parse a mode name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "silent" | "off" => Some(LoggingMode::Silent),
            "development" | "dev" => Some(LoggingMode::Development),
            "debug" => Some(LoggingMode::Debug),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid log filter '{0}'")]
    InvalidFilter(String),
}

/// Install a global subscriber for `mode`
///
/// The filter comes from `OREI_LOG_LEVEL`, then `RUST_LOG`, then the mode's
/// default level. Fails if a global subscriber is already set.
///
/// ```rust,ignore
/// orei_matrix::logging::init_logging(LoggingMode::Development)?;
/// ```
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    init_logging_with_filter(mode, None)
}

/// Like [`init_logging`], with an explicit filter taking precedence over the
/// environment
pub fn init_logging_with_filter(
    mode: LoggingMode,
    filter: Option<&str>,
) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter(filter, "info")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter(filter, "debug")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize from `OREI_LOG_MODE` (`silent`, `development`, `debug`)
///
/// Unset or unrecognized values mean silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = std::env::var(LOG_MODE_ENV)
        .ok()
        .and_then(|name| LoggingMode::from_name(&name))
        .unwrap_or(LoggingMode::Silent);

    init_logging(mode)
}

pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

fn create_env_filter(explicit: Option<&str>, default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directives = explicit
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_LEVEL_ENV).ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| default_level.to_string());

    EnvFilter::try_new(&directives).map_err(|_| LoggingError::InvalidFilter(directives))
}
