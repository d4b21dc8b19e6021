//! Request-independent dependencies shared by every download.

use std::sync::Arc;

use zipgate_core::{ArchiveStreamer, ManifestResolver, ManifestStore, ObjectFetcher};

/// Process-wide handles injected into the handler at construction time.
#[derive(Clone)]
pub struct ApiState {
    pub(crate) resolver: ManifestResolver,
    pub(crate) streamer: ArchiveStreamer,
}

impl ApiState {
    /// Bundle an already built resolver and streamer.
    #[must_use]
    pub const fn new(resolver: ManifestResolver, streamer: ArchiveStreamer) -> Self {
        Self { resolver, streamer }
    }

    /// Build state directly from the two backend clients.
    #[must_use]
    pub fn from_backends(
        store: Arc<dyn ManifestStore>,
        fetcher: Arc<dyn ObjectFetcher>,
        prefetch: usize,
    ) -> Self {
        Self::new(
            ManifestResolver::new(store),
            ArchiveStreamer::new(fetcher).with_prefetch(prefetch),
        )
    }
}
