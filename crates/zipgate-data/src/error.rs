//! Error types for adapter construction.

use thiserror::Error;
use zipgate_core::StoreError;

/// Result alias for adapter construction.
pub type Result<T> = std::result::Result<T, DataError>;

/// Failures raised while building or probing a backend adapter.
#[derive(Debug, Error)]
pub enum DataError {
    /// The lookup store address could not be turned into a connection URL.
    #[error("invalid lookup store address")]
    RedisAddress {
        /// Host that was rejected.
        host: String,
        /// Underlying URL error, when the host failed to parse.
        #[source]
        source: Option<url::ParseError>,
    },
    /// The connection pool could not be created.
    #[error("failed to create lookup store pool")]
    RedisPool {
        /// Underlying pool error.
        #[source]
        source: deadpool_redis::CreatePoolError,
    },
    /// The startup liveness check failed.
    #[error("lookup store is unreachable")]
    RedisUnreachable {
        /// Underlying store error.
        #[source]
        source: StoreError,
    },
    /// The object store client could not be configured.
    #[error("failed to configure object store")]
    ObjectStore {
        /// Bucket the client was built for.
        bucket: String,
        /// Underlying client error.
        #[source]
        source: object_store::Error,
    },
}
