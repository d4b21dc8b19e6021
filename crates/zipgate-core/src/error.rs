//! # Design
//!
//! - Typed outcomes for every expected failure; nothing here is fatal.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors so callers can log the full chain once.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed source error carried across the store contracts.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Transport-level failure reported by a lookup store implementation.
#[derive(Debug, Error)]
#[error("lookup store operation failed")]
pub struct StoreError {
    /// Operation identifier (for example `pool.get` or `get`).
    pub operation: &'static str,
    /// Underlying client error.
    #[source]
    pub source: BoxError,
}

impl StoreError {
    /// Wrap a client error raised during `operation`.
    pub fn new(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }
}

/// Reasons a token could not be turned into a manifest.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The lookup store could not be reached or the read failed.
    #[error("lookup store unavailable")]
    StoreUnavailable {
        /// Underlying store error.
        #[source]
        source: StoreError,
    },
    /// No (or an empty) value is stored for the token.
    #[error("token not found")]
    TokenNotFound,
    /// A value exists but does not decode into a descriptor list.
    #[error("malformed manifest")]
    MalformedManifest {
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}

impl ResolutionError {
    /// Machine-readable kind used in structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::TokenNotFound => "token_not_found",
            Self::MalformedManifest { .. } => "malformed_manifest",
        }
    }
}

/// Reasons an object could not be opened for reading.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The object does not exist in the backing store.
    #[error("object not found")]
    NotFound {
        /// Storage path that was requested.
        path: String,
    },
    /// Any other failure: network, permissions, credentials, bad path.
    #[error("object fetch failed")]
    FetchFailed {
        /// Storage path that was requested.
        path: String,
        /// Underlying client error.
        #[source]
        source: BoxError,
    },
}

impl FetchError {
    /// Build a generic fetch failure for `path`.
    pub fn failed(path: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::FetchFailed {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Storage path the failure refers to.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path } | Self::FetchFailed { path, .. } => path,
        }
    }

    /// Machine-readable classification used in structured logs.
    #[must_use]
    pub const fn classification(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::FetchFailed { .. } => "fetch_failed",
        }
    }
}
