//! Error types for configuration loading.

use thiserror::Error;

/// Reasons startup configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required environment variable")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is set but its value is unusable.
    #[error("invalid environment variable value")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value; `None` for secrets.
        value: Option<String>,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
