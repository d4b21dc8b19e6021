//! HTTP surface modules.

/// Shared constants and header names.
pub mod constants;
/// Download handler and query decoding.
pub mod download;
/// Empty-bodied rejection responses.
pub mod errors;
/// Router construction and server host.
pub mod router;
