//! # Design
//!
//! - Centralize startup errors from every layer the binary wires together.
//! - Keep error messages constant while carrying the failing operation.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: zipgate_config::ConfigError,
    },
    /// Logging could not be installed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: zipgate_telemetry::TelemetryError,
    },
    /// A backend client could not be built or reached.
    #[error("backend operation failed")]
    Data {
        /// Operation identifier.
        operation: &'static str,
        /// Source adapter error.
        source: zipgate_data::DataError,
    },
    /// The HTTP server failed to bind or stopped unexpectedly.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: zipgate_api::ApiServerError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: zipgate_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: zipgate_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn data(operation: &'static str, source: zipgate_data::DataError) -> Self {
        Self::Data { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: zipgate_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }

    /// Operation that failed.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Config { operation, .. }
            | Self::Telemetry { operation, .. }
            | Self::Data { operation, .. }
            | Self::ApiServer { operation, .. } => *operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;
    use std::net::{Ipv4Addr, SocketAddr};

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "config.from_env",
            zipgate_config::ConfigError::MissingEnv { name: "REDIS_HOST" },
        );
        assert!(matches!(config, AppError::Config { .. }));
        assert_eq!(config.operation(), "config.from_env");
        assert_eq!(config.to_string(), "configuration operation failed");

        let data = AppError::data(
            "redis.connect",
            zipgate_data::DataError::RedisAddress {
                host: "bad host".to_string(),
                source: None,
            },
        );
        assert!(matches!(data, AppError::Data { .. }));
        assert!(data.source().is_some());

        let api = AppError::api_server(
            "api_server.serve",
            zipgate_api::ApiServerError::Bind {
                addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
                source: io::Error::other("in use"),
            },
        );
        assert_eq!(api.operation(), "api_server.serve");
    }
}
