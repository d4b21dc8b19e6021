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

//! Core download-aggregation logic: resolve a token into a manifest and stream
//! the referenced objects as a single ZIP archive.
//!
//! Layout: `sanitize.rs` (name scrubbing), `model.rs` (descriptors and
//! manifests), `manifest.rs` (token resolution against the lookup store),
//! `fetch.rs` (object store contract), `archive.rs` (streaming ZIP writer),
//! `error.rs` (typed outcomes).

pub mod archive;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod model;
pub mod sanitize;

pub use archive::{ArchiveStreamer, ArchiveSummary};
pub use error::{FetchError, ResolutionError, StoreError};
pub use fetch::{ObjectFetcher, ObjectStream};
pub use manifest::{MANIFEST_KEY_PREFIX, ManifestResolver, ManifestStore, manifest_key};
pub use model::{FileDescriptor, Manifest};
pub use sanitize::{DEFAULT_ARCHIVE_NAME, DEFAULT_ENTRY_NAME, sanitize, sanitize_or};
