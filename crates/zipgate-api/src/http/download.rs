//! The download endpoint.
//!
//! # Design
//! - Validate the query, then resolve the token; both can still reject with
//!   an empty body.
//! - Headers are committed only once a manifest is in hand. From then on the
//!   response is a 200 and the archive task owns the outcome.
//! - The archive is written into an in-process pipe whose read half is the
//!   response body, so backpressure reaches the object reads.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{
        HeaderValue, Method, Uri,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::Response,
};
use tokio_util::io::ReaderStream;
use tracing::{Instrument, Span, info, warn};
use url::form_urlencoded;
use zipgate_core::{DEFAULT_ARCHIVE_NAME, sanitize_or};

use crate::http::constants::{
    ARCHIVE_CONTENT_TYPE, ARCHIVE_PIPE_CAPACITY, QUERY_SAVE_AS, QUERY_TOKEN,
};
use crate::http::errors::ApiError;
use crate::state::ApiState;

/// Validated query for one download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Opaque bearer token.
    pub token: String,
    /// Sanitised archive file name.
    pub save_as: String,
}

impl DownloadRequest {
    /// Decode the raw query string.
    ///
    /// When a parameter repeats, the first value wins.
    ///
    /// # Errors
    ///
    /// Returns a 400 rejection when the query is absent or empty, or when
    /// `token` is missing or empty.
    pub fn from_query(query: Option<&str>) -> Result<Self, ApiError> {
        let query = query
            .filter(|raw| !raw.is_empty())
            .ok_or(ApiError::bad_request("empty_query"))?;

        let mut token = None;
        let mut save_as = None;
        let mut seen_any = false;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            seen_any = true;
            match &*key {
                QUERY_TOKEN if token.is_none() => token = Some(value.into_owned()),
                QUERY_SAVE_AS if save_as.is_none() => save_as = Some(value.into_owned()),
                _ => {}
            }
        }
        if !seen_any {
            return Err(ApiError::bad_request("empty_query"));
        }

        let token = token
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::bad_request("missing_token"))?;
        let save_as = sanitize_or(save_as.as_deref().unwrap_or_default(), DEFAULT_ARCHIVE_NAME);
        Ok(Self { token, save_as })
    }

    /// `Content-Disposition` value naming the archive as an attachment.
    ///
    /// Falls back to the default name when the sanitised name still holds
    /// bytes a header cannot carry (control characters).
    #[must_use]
    pub fn content_disposition(&self) -> HeaderValue {
        attachment(&self.save_as)
            .or_else(|| attachment(DEFAULT_ARCHIVE_NAME))
            .unwrap_or_else(|| HeaderValue::from_static("attachment"))
    }
}

fn attachment(name: &str) -> Option<HeaderValue> {
    HeaderValue::from_bytes(format!("attachment; filename=\"{name}\"").as_bytes()).ok()
}

/// Serve one download: validate, resolve, then stream the archive.
pub(crate) async fn download(
    State(state): State<Arc<ApiState>>,
    method: Method,
    uri: Uri,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let request = DownloadRequest::from_query(uri.query())?;

    let manifest = state
        .resolver
        .resolve(&request.token)
        .await
        .map_err(|err| {
            warn!(
                kind = err.kind(),
                error = ?std::error::Error::source(&err),
                "manifest resolution failed"
            );
            ApiError::unauthorized(err.kind())
        })?;

    let (reader, writer) = tokio::io::duplex(ARCHIVE_PIPE_CAPACITY);
    let streamer = state.streamer.clone();
    let target = uri.path().to_string();
    tokio::spawn(
        async move {
            let summary = streamer.stream(manifest, writer).await;
            info!(
                method = %method,
                target = %target,
                elapsed_ms = elapsed_ms(started.elapsed()),
                entries_written = summary.entries_written,
                entries_skipped = summary.entries_skipped,
                completed = summary.completed,
                "download finished"
            );
        }
        .instrument(Span::current()),
    );

    let mut response = Response::new(Body::from_stream(ReaderStream::new(reader)));
    let headers = response.headers_mut();
    headers.insert(CONTENT_DISPOSITION, request.content_disposition());
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(ARCHIVE_CONTENT_TYPE));
    Ok(response)
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn rejected_with(query: Option<&str>) -> Option<(StatusCode, &'static str)> {
        DownloadRequest::from_query(query)
            .err()
            .map(|err| (err.status(), err.kind()))
    }

    #[test]
    fn empty_or_tokenless_queries_are_bad_requests() {
        assert_eq!(
            rejected_with(None),
            Some((StatusCode::BAD_REQUEST, "empty_query"))
        );
        assert_eq!(
            rejected_with(Some("")),
            Some((StatusCode::BAD_REQUEST, "empty_query"))
        );
        assert_eq!(
            rejected_with(Some("&&")),
            Some((StatusCode::BAD_REQUEST, "empty_query"))
        );
        for query in ["as=x.zip", "token=", "token", "token=&token=late"] {
            assert_eq!(
                rejected_with(Some(query)),
                Some((StatusCode::BAD_REQUEST, "missing_token")),
                "query {query:?}"
            );
        }
    }

    #[test]
    fn first_value_wins_and_values_are_decoded() -> Result<(), &'static str> {
        let request = DownloadRequest::from_query(Some("token=a%2Bb&token=other&as=Q3+report.zip"))
            .map_err(|err| err.kind())?;
        assert_eq!(request.token, "a+b");
        assert_eq!(request.save_as, "Q3 report.zip");
        Ok(())
    }

    #[test]
    fn save_as_is_sanitised_or_defaulted() -> Result<(), &'static str> {
        let cases = [
            ("token=t", "download.zip"),
            ("token=t&as=", "download.zip"),
            ("token=t&as=%3F%2A%3A", "download.zip"),
            ("token=t&as=my%22file%22%3F.zip", "myfile.zip"),
            ("token=t&as=..%2F..%2Fetc.zip", "....etc.zip"),
        ];
        for (query, expected) in cases {
            let request = DownloadRequest::from_query(Some(query)).map_err(|err| err.kind())?;
            assert_eq!(request.save_as, expected, "query {query:?}");
        }
        Ok(())
    }

    #[test]
    fn content_disposition_quotes_name_and_rejects_control_bytes() -> Result<(), &'static str> {
        let request = DownloadRequest::from_query(Some("token=t&as=r%C3%A9sum%C3%A9.zip"))
            .map_err(|err| err.kind())?;
        assert_eq!(
            request.content_disposition().as_bytes(),
            "attachment; filename=\"résumé.zip\"".as_bytes()
        );

        let request = DownloadRequest::from_query(Some("token=t&as=evil%0D%0ASet-Cookie%3Dx"))
            .map_err(|err| err.kind())?;
        assert_eq!(
            request.content_disposition(),
            HeaderValue::from_static("attachment; filename=\"download.zip\"")
        );
        Ok(())
    }
}
