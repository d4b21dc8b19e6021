//! Shared HTTP constants (headers, query keys, pipe sizing).

use std::time::Duration;

/// Query parameter carrying the download token.
pub const QUERY_TOKEN: &str = "token";
/// Query parameter carrying the requested archive file name.
pub const QUERY_SAVE_AS: &str = "as";
/// Content type of every successful download.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";
/// Request identifier header set and propagated by the middleware stack.
pub const HEADER_REQUEST_ID: &str = "x-request-id";
/// Capacity of the in-process pipe between the archive task and the response body.
pub const ARCHIVE_PIPE_CAPACITY: usize = 64 * 1024;
/// Default time in-flight downloads may keep streaming once shutdown begins.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);
