//! Parsing helpers for raw environment values.

use std::net::IpAddr;

use zipgate_telemetry::LogFormat;

use crate::error::{ConfigError, ConfigResult};

#[allow(clippy::redundant_pub_crate)]
pub(crate) fn parse_port(name: &'static str, raw: &str) -> ConfigResult<u16> {
    let port: u16 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        reason: "must be an integer between 1 and 65535",
        value: Some(raw.to_string()),
    })?;
    if port == 0 {
        return Err(ConfigError::InvalidValue {
            name,
            reason: "must be an integer between 1 and 65535",
            value: Some(raw.to_string()),
        });
    }
    Ok(port)
}

#[allow(clippy::redundant_pub_crate)]
pub(crate) fn parse_bind_addr(name: &'static str, raw: &str) -> ConfigResult<IpAddr> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        reason: "must be an IP address",
        value: Some(raw.to_string()),
    })
}

#[allow(clippy::redundant_pub_crate)]
pub(crate) fn parse_bounded(
    name: &'static str,
    raw: &str,
    min: usize,
    max: usize,
    reason: &'static str,
) -> ConfigResult<usize> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|value| (min..=max).contains(value))
        .ok_or_else(|| ConfigError::InvalidValue {
            name,
            reason,
            value: Some(raw.to_string()),
        })
}

#[allow(clippy::redundant_pub_crate)]
pub(crate) fn parse_log_format(name: &'static str, raw: &str) -> ConfigResult<LogFormat> {
    raw.parse().map_err(|()| ConfigError::InvalidValue {
        name,
        reason: "must be `json` or `pretty`",
        value: Some(raw.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_rejects_zero_and_garbage() {
        assert_eq!(parse_port("PORT", "8080").ok(), Some(8080));
        for raw in ["0", "-1", "http", "70000", ""] {
            assert!(
                matches!(
                    parse_port("PORT", raw),
                    Err(ConfigError::InvalidValue { name: "PORT", .. })
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn bounded_values_respect_range() {
        let reason = "out of range";
        assert_eq!(parse_bounded("N", "4", 1, 16, reason).ok(), Some(4));
        assert!(parse_bounded("N", "0", 1, 16, reason).is_err());
        assert!(parse_bounded("N", "17", 1, 16, reason).is_err());
    }

    #[test]
    fn bind_addr_accepts_v4_and_v6() {
        assert!(parse_bind_addr("ADDR", "0.0.0.0").is_ok());
        assert!(parse_bind_addr("ADDR", "::1").is_ok());
        assert!(parse_bind_addr("ADDR", "localhost").is_err());
    }
}
