//! Object store contract consumed by the archive streamer.

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::FetchError;

/// Readable body of one stored object, yielded as chunks.
///
/// Dropping the stream releases whatever connection backs it, so abandoning a
/// partially read object needs no explicit close.
pub type ObjectStream = BoxStream<'static, io::Result<Bytes>>;

/// Opens objects in the backing store by storage path.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Open `storage_path` for reading.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotFound`] when the object does not exist and
    /// [`FetchError::FetchFailed`] for every other failure.
    async fn open(&self, storage_path: &str) -> Result<ObjectStream, FetchError>;
}
