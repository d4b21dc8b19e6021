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

//! Backend adapters for the zipgate core contracts.
//!
//! Layout: `redis.rs` (pooled lookup store), `objects.rs` (S3 object
//! fetcher), `error.rs` (adapter construction failures).

pub mod error;
pub mod objects;
pub mod redis;

pub use error::{DataError, Result};
pub use objects::S3ObjectFetcher;
pub use redis::RedisManifestStore;
