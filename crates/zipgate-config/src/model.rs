//! Typed startup settings.
//!
//! Secret material is held as plain strings but never rendered by `Debug`.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use zipgate_telemetry::LogFormat;

const REDACTED: &str = "<redacted>";

/// Complete process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Lookup store connection settings.
    pub redis: RedisConfig,
    /// Object store settings.
    pub object_store: ObjectStoreConfig,
    /// Object opens allowed in flight ahead of the entry being written.
    pub prefetch: usize,
    /// Logging setup.
    pub logging: LoggingSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: IpAddr,
    /// Port to bind; never zero.
    pub port: u16,
    /// How long in-flight downloads may run once shutdown begins.
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    /// Socket address combining bind address and port.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

/// Lookup store connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct RedisConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// AUTH password sent on every new connection.
    pub password: Option<String>,
    /// Maximum pooled connections.
    pub pool_size: usize,
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

/// Static access key pair for the object store.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    /// Access key identifier.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &REDACTED)
            .finish()
    }
}

/// Object store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStoreConfig {
    /// Bucket holding archived objects.
    pub bucket: String,
    /// Bucket region.
    pub region: String,
    /// Static credentials; `None` defers to the provider chain.
    pub credentials: Option<StaticCredentials>,
    /// Custom S3-compatible endpoint.
    pub endpoint: Option<String>,
}

/// Logging setup resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `EnvFilter` directives.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}
