//! Rejections returned before any archive bytes are committed.
//!
//! Bodies are always empty; the kind is only recorded in logs so callers
//! cannot tell an unknown token from a store outage.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;

/// Rejection with a status and a machine-readable kind for logs.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
}

impl ApiError {
    const fn new(status: StatusCode, kind: &'static str) -> Self {
        Self { status, kind }
    }

    /// Malformed or incomplete query.
    #[must_use]
    pub const fn bad_request(kind: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, kind)
    }

    /// The token could not be turned into a manifest, for any reason.
    #[must_use]
    pub const fn unauthorized(kind: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, kind)
    }

    /// Status sent to the client.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Kind recorded in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!(
            status = self.status.as_u16(),
            kind = self.kind,
            "request rejected"
        );
        self.status.into_response()
    }
}
