//! Streaming ZIP assembly from a resolved manifest.
//!
//! # Design
//! - Entries are written in manifest order; the archive is emitted
//!   incrementally so nothing buffers the whole archive.
//! - A descriptor that cannot be fetched is logged and skipped; it never
//!   aborts the archive.
//! - A failing sink is terminal: remaining entries are abandoned and the
//!   central directory is not written.
//! - Opens may run ahead of the entry being written (bounded by the prefetch
//!   depth) without changing write order.

use std::io;
use std::sync::Arc;

use async_zip::base::write::ZipFileWriter;
use async_zip::error::ZipError;
use async_zip::{Compression, ZipEntryBuilder};
use futures::io::{AsyncWrite as FuturesAsyncWrite, AsyncWriteExt as _};
use futures::{StreamExt, stream};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt as _};
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, error, warn};

use crate::error::FetchError;
use crate::fetch::{ObjectFetcher, ObjectStream};
use crate::model::{FileDescriptor, Manifest};

/// Default number of objects opened ahead of the entry being written.
pub const DEFAULT_PREFETCH: usize = 1;

/// Outcome counters for one streamed archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Entries added to the archive.
    pub entries_written: usize,
    /// Descriptors skipped (missing path, not found, fetch failure).
    pub entries_skipped: usize,
    /// Whether the central directory was written and the sink shut down.
    pub completed: bool,
}

/// Writes a manifest's objects into a ZIP archive on an output sink.
#[derive(Clone)]
pub struct ArchiveStreamer {
    fetcher: Arc<dyn ObjectFetcher>,
    prefetch: usize,
}

struct PendingEntry {
    entry_path: String,
    storage_path: String,
    body: ObjectStream,
}

enum Prepared {
    Skip,
    Ready(PendingEntry),
}

#[derive(Debug, Error)]
enum SinkError {
    #[error("archive container write failed")]
    Container(#[from] ZipError),
    #[error("archive sink write failed")]
    Io(#[from] io::Error),
}

impl ArchiveStreamer {
    /// Create a streamer that fetches objects through `fetcher`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn ObjectFetcher>) -> Self {
        Self {
            fetcher,
            prefetch: DEFAULT_PREFETCH,
        }
    }

    /// Allow up to `depth` objects to be opened ahead of the current entry.
    #[must_use]
    pub fn with_prefetch(mut self, depth: usize) -> Self {
        self.prefetch = depth.max(1);
        self
    }

    /// Configured prefetch depth.
    #[must_use]
    pub const fn prefetch(&self) -> usize {
        self.prefetch
    }

    /// Stream every fetchable descriptor of `manifest` into `sink` as a ZIP
    /// archive, then finalise the archive.
    ///
    /// Never fails: per-entry problems are logged and skipped, and a broken
    /// sink ends the stream early with `completed == false`.
    pub async fn stream<W>(&self, manifest: Manifest, sink: W) -> ArchiveSummary
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut writer = ZipFileWriter::with_tokio(sink);
        let mut summary = ArchiveSummary::default();

        let fetcher = Arc::clone(&self.fetcher);
        let mut prepared = stream::iter(manifest)
            .map(move |descriptor| {
                AbortOnDropHandle::new(tokio::spawn(prepare(Arc::clone(&fetcher), descriptor)))
            })
            .buffered(self.prefetch);

        while let Some(joined) = prepared.next().await {
            let pending = match joined {
                Ok(Prepared::Ready(pending)) => pending,
                Ok(Prepared::Skip) => {
                    summary.entries_skipped += 1;
                    continue;
                }
                Err(err) => {
                    error!(error = %err, "object open task failed; skipping");
                    summary.entries_skipped += 1;
                    continue;
                }
            };

            let entry_path = pending.entry_path.clone();
            if let Err(err) = write_entry(&mut writer, pending).await {
                error!(
                    entry_path = %entry_path,
                    error = %err,
                    source = ?std::error::Error::source(&err),
                    "archive sink failed; abandoning remaining entries"
                );
                return summary;
            }
            summary.entries_written += 1;
        }

        match finish(writer).await {
            Ok(()) => summary.completed = true,
            Err(err) => error!(error = %err, "failed to finalise archive"),
        }
        debug!(
            entries_written = summary.entries_written,
            entries_skipped = summary.entries_skipped,
            "archive stream finished"
        );
        summary
    }
}

async fn prepare(fetcher: Arc<dyn ObjectFetcher>, descriptor: FileDescriptor) -> Prepared {
    if !descriptor.has_storage_path() {
        warn!(
            file_name = %descriptor.file_name,
            folder = %descriptor.folder,
            classification = "missing_path",
            "descriptor has no storage path; skipping"
        );
        return Prepared::Skip;
    }

    let entry_path = descriptor.entry_path();
    match fetcher.open(&descriptor.storage_path).await {
        Ok(body) => Prepared::Ready(PendingEntry {
            entry_path,
            storage_path: descriptor.storage_path,
            body,
        }),
        Err(err @ FetchError::NotFound { .. }) => {
            warn!(
                storage_path = %err.path(),
                classification = err.classification(),
                "object not found; skipping"
            );
            Prepared::Skip
        }
        Err(err @ FetchError::FetchFailed { .. }) => {
            warn!(
                storage_path = %err.path(),
                classification = err.classification(),
                error = ?std::error::Error::source(&err),
                "object fetch failed; skipping"
            );
            Prepared::Skip
        }
    }
}

async fn write_entry<S>(
    writer: &mut ZipFileWriter<S>,
    pending: PendingEntry,
) -> Result<(), SinkError>
where
    S: FuturesAsyncWrite + Unpin,
{
    let PendingEntry {
        entry_path,
        storage_path,
        mut body,
    } = pending;

    let builder = ZipEntryBuilder::new(entry_path.clone().into(), Compression::Deflate);
    let mut entry = writer.write_entry_stream(builder).await?;

    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => entry.write_all(&bytes).await?,
            Err(err) => {
                warn!(
                    storage_path = %storage_path,
                    entry_path = %entry_path,
                    classification = "read_failed",
                    error = %err,
                    "object stream failed mid-entry; entry truncated"
                );
                break;
            }
        }
    }
    drop(body);

    entry.close().await?;
    Ok(())
}

async fn finish<W>(writer: ZipFileWriter<tokio_util::compat::Compat<W>>) -> Result<(), SinkError>
where
    W: AsyncWrite + Unpin,
{
    let mut sink = writer.close().await?.into_inner();
    sink.shutdown().await?;
    Ok(())
}
