#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! HTTP surface for zipgate: one endpoint that turns a token into a streamed
//! ZIP download.
//!
//! Layout: `state.rs` (injected resolver and streamer), `http/` (handler,
//! router, response errors), `error.rs` (listener bind, serve and drain failures).

pub mod error;
pub mod http;
pub mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
pub use state::ApiState;
