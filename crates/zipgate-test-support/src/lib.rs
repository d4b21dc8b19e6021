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

//! Shared test helpers used across integration suites.
//!
//! Layout: `memory.rs` (in-memory store fakes), `archive.rs` (ZIP readback),
//! `redis.rs` (containerised lookup store).

pub mod archive;
pub mod memory;
pub mod redis;
