//! Fallback values for optional settings.
//!
//! # Design
//! - Defaults match the previously deployed service so existing environments keep working.

use std::net::{IpAddr, Ipv4Addr};

/// Listening port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8080;
/// Listening address when `ZIPGATE_BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
/// Lookup store port when `REDIS_PORT` is unset.
pub const DEFAULT_REDIS_PORT: u16 = 6379;
/// Maximum pooled lookup store connections.
pub const DEFAULT_REDIS_POOL_SIZE: usize = 10;
/// Object opens in flight ahead of the entry being written.
pub const DEFAULT_PREFETCH: usize = 1;
/// Upper bound accepted for `ZIPGATE_PREFETCH`.
pub const MAX_PREFETCH: usize = 16;
/// Seconds in-flight downloads may keep running after a shutdown signal.
pub const DEFAULT_SHUTDOWN_GRACE_SECS: usize = 30;
/// Upper bound accepted for `ZIPGATE_SHUTDOWN_GRACE_SECS`.
pub const MAX_SHUTDOWN_GRACE_SECS: usize = 3600;
