//! Disposable Redis server for lookup-store suites.
//!
//! [`RedisFixture::start`] yields `None` when no Docker endpoint answers, so
//! suites can skip instead of failing on machines without a daemon.

use std::net::{TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use deadpool_redis::redis::cmd;
use deadpool_redis::{Config, Runtime};
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use zipgate_config::RedisConfig;

/// Password the fixture server demands from every connection.
pub const PASSWORD: &str = "zipgate-test";

const IMAGE: &str = "redis";
const TAG: &str = "7-alpine";
const REDIS_PORT: u16 = 6379;
const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// A running Redis container with authentication enabled.
pub struct RedisFixture {
    _container: ContainerAsync<GenericImage>,
    host: String,
    port: u16,
}

impl RedisFixture {
    /// Start a fresh container, or return `None` when Docker is unreachable.
    ///
    /// # Errors
    ///
    /// Returns an error when a daemon answers but the container cannot be
    /// started or its port cannot be resolved.
    pub async fn start() -> Result<Option<Self>> {
        if !docker_reachable() {
            return Ok(None);
        }
        let container = GenericImage::new(IMAGE, TAG)
            .with_exposed_port(ContainerPort::Tcp(REDIS_PORT))
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .with_cmd(["redis-server", "--requirepass", PASSWORD])
            .start()
            .await
            .context("failed to start redis container")?;
        let host = container
            .get_host()
            .await
            .context("failed to resolve redis container host")?
            .to_string();
        let port = container
            .get_host_port_ipv4(ContainerPort::Tcp(REDIS_PORT))
            .await
            .context("failed to resolve redis host port")?;
        Ok(Some(Self {
            _container: container,
            host,
            port,
        }))
    }

    /// Connection settings for the lookup store adapter.
    #[must_use]
    pub fn config(&self) -> RedisConfig {
        RedisConfig {
            host: self.host.clone(),
            port: self.port,
            password: Some(PASSWORD.to_string()),
            pool_size: 2,
        }
    }

    /// Store `value` under `key` through a dedicated connection.
    ///
    /// # Errors
    ///
    /// Returns an error when the server cannot be reached or rejects the write.
    pub async fn seed(&self, key: &str, value: &str) -> Result<()> {
        let url = format!("redis://:{PASSWORD}@{}:{}/", self.host, self.port);
        let pool = Config::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .context("failed to build seeding pool")?;
        let mut conn = pool.get().await.context("failed to check out connection")?;
        let () = cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await
            .with_context(|| format!("failed to seed {key}"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DockerEndpoint {
    Socket(PathBuf),
    Tcp(String),
    Unchecked,
}

impl DockerEndpoint {
    fn reachable(&self) -> bool {
        match self {
            Self::Socket(path) => path.exists(),
            Self::Tcp(authority) => authority.to_socket_addrs().is_ok_and(|mut addrs| {
                addrs.any(|addr| TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).is_ok())
            }),
            Self::Unchecked => true,
        }
    }
}

fn docker_reachable() -> bool {
    let docker_host = std::env::var("DOCKER_HOST").ok();
    let home = std::env::var("HOME").ok();
    endpoints(docker_host.as_deref(), home.as_deref())
        .iter()
        .any(DockerEndpoint::reachable)
}

/// Endpoints to try: `DOCKER_HOST` when set, otherwise the system socket and
/// the per-user Docker Desktop socket.
fn endpoints(docker_host: Option<&str>, home: Option<&str>) -> Vec<DockerEndpoint> {
    if let Some(host) = docker_host.filter(|host| !host.is_empty()) {
        let endpoint = if let Some(path) = host.strip_prefix("unix://") {
            DockerEndpoint::Socket(PathBuf::from(path))
        } else if let Some(authority) = host.strip_prefix("tcp://") {
            DockerEndpoint::Tcp(authority.trim_end_matches('/').to_string())
        } else {
            DockerEndpoint::Unchecked
        };
        return vec![endpoint];
    }

    let mut endpoints = vec![DockerEndpoint::Socket(PathBuf::from(
        "/var/run/docker.sock",
    ))];
    if let Some(home) = home {
        endpoints.push(DockerEndpoint::Socket(
            PathBuf::from(home).join(".docker/run/docker.sock"),
        ));
    }
    endpoints
}
