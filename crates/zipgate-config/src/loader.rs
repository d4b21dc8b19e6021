//! Environment-variable loading.
//!
//! # Design
//! - Read every variable through a lookup function so tests never mutate the
//!   process environment.
//! - Treat blank values as unset.
//! - Fail on the first invalid variable; startup cannot continue anyway.

use std::time::Duration;

use zipgate_telemetry::{DEFAULT_LOG_LEVEL, LogFormat};

use crate::defaults::{
    DEFAULT_BIND_ADDR, DEFAULT_PORT, DEFAULT_PREFETCH, DEFAULT_REDIS_POOL_SIZE, DEFAULT_REDIS_PORT,
    DEFAULT_SHUTDOWN_GRACE_SECS, MAX_PREFETCH, MAX_SHUTDOWN_GRACE_SECS,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    AppConfig, LoggingSettings, ObjectStoreConfig, RedisConfig, ServerConfig, StaticCredentials,
};
use crate::validate::{parse_bind_addr, parse_bounded, parse_log_format, parse_port};

/// Listening port.
pub const ENV_PORT: &str = "PORT";
/// Listening IP address.
pub const ENV_BIND_ADDR: &str = "ZIPGATE_BIND_ADDR";
/// Seconds in-flight downloads may keep running after a shutdown signal.
pub const ENV_SHUTDOWN_GRACE: &str = "ZIPGATE_SHUTDOWN_GRACE_SECS";
/// Lookup store host.
pub const ENV_REDIS_HOST: &str = "REDIS_HOST";
/// Lookup store port.
pub const ENV_REDIS_PORT: &str = "REDIS_PORT";
/// Lookup store password.
pub const ENV_REDIS_PASSWORD: &str = "REDIS_PASSWORD";
/// Lookup store pool size.
pub const ENV_REDIS_POOL_SIZE: &str = "REDIS_POOL_SIZE";
/// Object store bucket.
pub const ENV_S3_BUCKET: &str = "S3_BUCKET";
/// Object store region.
pub const ENV_S3_REGION: &str = "S3_REGION";
/// Static access key identifier.
pub const ENV_S3_KEY: &str = "S3_KEY";
/// Static secret access key.
pub const ENV_S3_SECRET: &str = "S3_SECRET";
/// Custom object store endpoint.
pub const ENV_S3_ENDPOINT: &str = "S3_ENDPOINT";
/// Prefetch depth.
pub const ENV_PREFETCH: &str = "ZIPGATE_PREFETCH";
/// Log output format.
pub const ENV_LOG_FORMAT: &str = "ZIPGATE_LOG_FORMAT";
/// Log filter directives.
pub const ENV_RUST_LOG: &str = "RUST_LOG";

/// Load configuration from the process environment.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnv`] when a required variable is unset and
/// [`ConfigError::InvalidValue`] when a value cannot be used.
pub fn from_env() -> ConfigResult<AppConfig> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Load configuration through an arbitrary variable lookup.
///
/// # Errors
///
/// Same as [`from_env`].
pub fn from_lookup<F>(lookup: F) -> ConfigResult<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let env = Env { lookup };
    Ok(AppConfig {
        server: load_server(&env)?,
        redis: load_redis(&env)?,
        object_store: load_object_store(&env)?,
        prefetch: env.parsed(ENV_PREFETCH, DEFAULT_PREFETCH, |name, raw| {
            parse_bounded(
                name,
                raw,
                1,
                MAX_PREFETCH,
                "must be an integer between 1 and 16",
            )
        })?,
        logging: load_logging(&env)?,
    })
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> ConfigResult<String> {
        self.optional(name).ok_or(ConfigError::MissingEnv { name })
    }

    fn parsed<T, P>(&self, name: &'static str, default: T, parse: P) -> ConfigResult<T>
    where
        P: FnOnce(&'static str, &str) -> ConfigResult<T>,
    {
        self.optional(name)
            .map_or(Ok(default), |raw| parse(name, &raw))
    }
}

fn load_server<F>(env: &Env<F>) -> ConfigResult<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let grace_secs = env.parsed(ENV_SHUTDOWN_GRACE, DEFAULT_SHUTDOWN_GRACE_SECS, |name, raw| {
        parse_bounded(
            name,
            raw,
            0,
            MAX_SHUTDOWN_GRACE_SECS,
            "must be a number of seconds up to 3600",
        )
    })?;
    Ok(ServerConfig {
        bind_addr: env.parsed(ENV_BIND_ADDR, DEFAULT_BIND_ADDR, parse_bind_addr)?,
        port: env.parsed(ENV_PORT, DEFAULT_PORT, parse_port)?,
        shutdown_grace: Duration::from_secs(u64::try_from(grace_secs).unwrap_or(u64::MAX)),
    })
}

fn load_redis<F>(env: &Env<F>) -> ConfigResult<RedisConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let pool_size = env.parsed(ENV_REDIS_POOL_SIZE, DEFAULT_REDIS_POOL_SIZE, |name, raw| {
        parse_bounded(
            name,
            raw,
            1,
            usize::from(u16::MAX),
            "must be a positive integer",
        )
    })?;
    Ok(RedisConfig {
        host: env.required(ENV_REDIS_HOST)?.trim().to_string(),
        port: env.parsed(ENV_REDIS_PORT, DEFAULT_REDIS_PORT, parse_port)?,
        password: env.optional(ENV_REDIS_PASSWORD),
        pool_size,
    })
}

fn load_object_store<F>(env: &Env<F>) -> ConfigResult<ObjectStoreConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let bucket = env.required(ENV_S3_BUCKET)?.trim().to_string();
    let region = env.required(ENV_S3_REGION)?.trim().to_string();
    let credentials = match (env.optional(ENV_S3_KEY), env.optional(ENV_S3_SECRET)) {
        (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
            access_key_id,
            secret_access_key,
        }),
        (None, None) => None,
        (Some(_), None) => {
            return Err(ConfigError::InvalidValue {
                name: ENV_S3_SECRET,
                reason: "must be set together with S3_KEY",
                value: None,
            });
        }
        (None, Some(_)) => {
            return Err(ConfigError::InvalidValue {
                name: ENV_S3_KEY,
                reason: "must be set together with S3_SECRET",
                value: None,
            });
        }
    };
    Ok(ObjectStoreConfig {
        bucket,
        region,
        credentials,
        endpoint: env.optional(ENV_S3_ENDPOINT).map(|raw| raw.trim().to_string()),
    })
}

fn load_logging<F>(env: &Env<F>) -> ConfigResult<LoggingSettings>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(LoggingSettings {
        filter: env
            .optional(ENV_RUST_LOG)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        format: env.parsed(ENV_LOG_FORMAT, LogFormat::infer(), parse_log_format)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("REDIS_HOST", "cache.internal"),
        ("S3_BUCKET", "archive"),
        ("S3_REGION", "eu-west-1"),
    ];

    fn with_required(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        let mut pairs: Vec<(&str, &str)> = REQUIRED.to_vec();
        pairs.extend_from_slice(extra);
        pairs
    }

    #[test]
    fn minimal_environment_uses_defaults() -> anyhow::Result<()> {
        let config = from_lookup(lookup_from(REQUIRED))?;

        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.server.shutdown_grace, Duration::from_secs(30));
        assert_eq!(config.redis.host, "cache.internal");
        assert_eq!(config.redis.port, DEFAULT_REDIS_PORT);
        assert_eq!(config.redis.password, None);
        assert_eq!(config.redis.pool_size, DEFAULT_REDIS_POOL_SIZE);
        assert_eq!(config.object_store.bucket, "archive");
        assert_eq!(config.object_store.region, "eu-west-1");
        assert!(config.object_store.credentials.is_none());
        assert!(config.object_store.endpoint.is_none());
        assert_eq!(config.prefetch, DEFAULT_PREFETCH);
        assert_eq!(config.logging.filter, DEFAULT_LOG_LEVEL);
        assert_eq!(config.logging.format, LogFormat::infer());
        Ok(())
    }

    #[test]
    fn explicit_values_override_defaults() -> anyhow::Result<()> {
        let pairs = with_required(&[
            ("PORT", "9090"),
            ("ZIPGATE_BIND_ADDR", "127.0.0.1"),
            ("ZIPGATE_SHUTDOWN_GRACE_SECS", "0"),
            ("REDIS_PORT", "6380"),
            ("REDIS_PASSWORD", "hunter2"),
            ("REDIS_POOL_SIZE", "32"),
            ("S3_KEY", "AKIA"),
            ("S3_SECRET", "s3cr3t"),
            ("S3_ENDPOINT", "http://minio:9000"),
            ("ZIPGATE_PREFETCH", "4"),
            ("ZIPGATE_LOG_FORMAT", "json"),
            ("RUST_LOG", "zipgate_core=debug"),
        ]);
        let config = from_lookup(lookup_from(&pairs))?;

        assert_eq!(config.server.socket_addr().to_string(), "127.0.0.1:9090");
        assert_eq!(config.server.shutdown_grace, Duration::ZERO);
        assert_eq!(config.redis.port, 6380);
        assert_eq!(config.redis.password.as_deref(), Some("hunter2"));
        assert_eq!(config.redis.pool_size, 32);
        assert_eq!(
            config.object_store.credentials,
            Some(StaticCredentials {
                access_key_id: "AKIA".to_string(),
                secret_access_key: "s3cr3t".to_string(),
            })
        );
        assert_eq!(
            config.object_store.endpoint.as_deref(),
            Some("http://minio:9000")
        );
        assert_eq!(config.prefetch, 4);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.filter, "zipgate_core=debug");
        Ok(())
    }

    #[test]
    fn missing_required_variables_are_named() {
        for missing in ["REDIS_HOST", "S3_BUCKET", "S3_REGION"] {
            let pairs: Vec<_> = REQUIRED
                .iter()
                .copied()
                .filter(|(key, _)| *key != missing)
                .collect();
            let err = from_lookup(lookup_from(&pairs)).err();
            assert!(
                matches!(err, Some(ConfigError::MissingEnv { name }) if name == missing),
                "expected {missing} to be reported, got {err:?}"
            );
        }
    }

    #[test]
    fn blank_values_count_as_unset() {
        let pairs = with_required(&[("REDIS_HOST", "  ")]);
        assert!(matches!(
            from_lookup(lookup_from(&pairs)),
            Err(ConfigError::MissingEnv { name: "REDIS_HOST" })
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            ("PORT", "0"),
            ("PORT", "http"),
            ("ZIPGATE_BIND_ADDR", "example.com"),
            ("ZIPGATE_SHUTDOWN_GRACE_SECS", "3601"),
            ("ZIPGATE_SHUTDOWN_GRACE_SECS", "-1"),
            ("REDIS_PORT", "99999"),
            ("REDIS_POOL_SIZE", "0"),
            ("ZIPGATE_PREFETCH", "0"),
            ("ZIPGATE_PREFETCH", "17"),
            ("ZIPGATE_LOG_FORMAT", "xml"),
        ];
        for (name, value) in cases {
            let pairs = with_required(&[(name, value)]);
            let err = from_lookup(lookup_from(&pairs)).err();
            assert!(
                matches!(&err, Some(ConfigError::InvalidValue { name: got, .. }) if *got == name),
                "{name}={value} should be invalid, got {err:?}"
            );
        }
    }

    #[test]
    fn credentials_must_be_paired_and_secret_is_not_echoed() {
        let pairs = with_required(&[("S3_KEY", "AKIA")]);
        let err = from_lookup(lookup_from(&pairs)).err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidValue {
                name: "S3_SECRET",
                value: None,
                ..
            })
        ));

        let pairs = with_required(&[("S3_SECRET", "s3cr3t")]);
        let err = from_lookup(lookup_from(&pairs)).err();
        assert!(matches!(
            &err,
            Some(ConfigError::InvalidValue { name: "S3_KEY", .. })
        ));
        assert!(!format!("{err:?}").contains("s3cr3t"));
    }
}
