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

//! zipgate application bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (config, logging, backends, server), `error.rs`
//! (startup failures).

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Application-level error aggregation.
pub mod error;

pub use bootstrap::{run_app, serve};
pub use error::{AppError, AppResult};
