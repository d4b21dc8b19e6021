//! Pooled Redis lookup store.
//!
//! # Design
//! - One `GET` per manifest lookup; values are returned as raw bytes and
//!   decoded by the resolver.
//! - The pool runs a `PING` before handing out a recycled connection, so a
//!   dead connection is replaced instead of failing a request.
//! - Every new connection authenticates with the configured password.

use async_trait::async_trait;
use deadpool_redis::redis::cmd;
use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime};
use tracing::{debug, info};
use url::Url;
use zipgate_config::RedisConfig;
use zipgate_core::{ManifestStore, StoreError};

use crate::error::{DataError, Result};

/// Lookup store backed by a bounded Redis connection pool.
#[derive(Clone)]
pub struct RedisManifestStore {
    pool: Pool,
}

impl RedisManifestStore {
    /// Build the pool for `config`. No connection is opened until first use.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::RedisAddress`] when the host cannot form a URL
    /// and [`DataError::RedisPool`] when the pool cannot be created.
    pub fn connect(config: &RedisConfig) -> Result<Self> {
        let url = connection_url(config)?;
        let mut pool_config = Config::from_url(url.as_str());
        pool_config.pool = Some(PoolConfig::new(config.pool_size));
        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|source| DataError::RedisPool { source })?;
        info!(
            host = %config.host,
            port = config.port,
            pool_size = config.pool_size,
            authenticated = config.password.is_some(),
            "lookup store pool configured"
        );
        Ok(Self { pool })
    }

    /// Round-trip a `PING` to prove the store is reachable and the
    /// credentials are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::RedisUnreachable`] when no connection can be
    /// checked out or the command fails.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self
            .checkout()
            .await
            .map_err(|source| DataError::RedisUnreachable { source })?;
        let reply: String = cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|err| DataError::RedisUnreachable {
                source: StoreError::new("ping", err),
            })?;
        debug!(reply = %reply, "lookup store answered ping");
        Ok(())
    }

    async fn checkout(&self) -> std::result::Result<Connection, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|err| StoreError::new("pool.get", err))
    }
}

#[async_trait]
impl ManifestStore for RedisManifestStore {
    async fn fetch(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.checkout().await?;
        let value: Option<Vec<u8>> = cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|err| StoreError::new("get", err))?;
        Ok(value)
    }
}

fn connection_url(config: &RedisConfig) -> Result<Url> {
    let invalid = |source: Option<url::ParseError>| DataError::RedisAddress {
        host: config.host.clone(),
        source,
    };
    let mut url = Url::parse("redis://localhost/")
        .map_err(|err| invalid(Some(err)))?;
    url.set_host(Some(&config.host))
        .map_err(|err| invalid(Some(err)))?;
    url.set_port(Some(config.port)).map_err(|()| invalid(None))?;
    if let Some(secret) = &config.password {
        url.set_password(Some(secret)).map_err(|()| invalid(None))?;
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str, password: Option<&str>) -> RedisConfig {
        RedisConfig {
            host: host.to_string(),
            port: 6380,
            password: password.map(str::to_string),
            pool_size: 4,
        }
    }

    #[test]
    fn connection_url_carries_host_port_and_password() -> anyhow::Result<()> {
        let url = connection_url(&config("cache.internal", Some("p@ss word")))?;
        assert_eq!(url.scheme(), "redis");
        assert_eq!(url.host_str(), Some("cache.internal"));
        assert_eq!(url.port(), Some(6380));
        assert_eq!(url.username(), "");
        assert_eq!(url.password(), Some("p%40ss%20word"));

        let anonymous = connection_url(&config("10.0.0.7", None))?;
        assert_eq!(anonymous.password(), None);
        Ok(())
    }

    #[test]
    fn unusable_hosts_are_rejected() {
        assert!(matches!(
            connection_url(&config("bad host", None)),
            Err(DataError::RedisAddress { .. })
        ));
    }

    #[tokio::test]
    async fn connect_is_lazy_and_unreachable_store_fails_ping() -> anyhow::Result<()> {
        let mut unreachable = config("127.0.0.1", None);
        unreachable.port = 1;
        let store = RedisManifestStore::connect(&unreachable)?;

        assert!(matches!(
            store.ping().await,
            Err(DataError::RedisUnreachable { .. })
        ));
        assert!(store.fetch("zip:tok").await.is_err());
        Ok(())
    }
}
