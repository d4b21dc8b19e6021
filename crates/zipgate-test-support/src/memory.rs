//! In-memory stand-ins for the lookup store and the object store.
//!
//! Both fakes record what they were asked for so suites can assert on call
//! counts and ordering without a live backend.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream;
use zipgate_core::{FetchError, ManifestStore, ObjectFetcher, ObjectStream, StoreError};

/// Lookup store backed by a map, with an optional forced outage.
#[derive(Debug, Default)]
pub struct MemoryManifestStore {
    values: Mutex<HashMap<String, Vec<u8>>>,
    unavailable: bool,
    reads: Mutex<Vec<String>>,
}

impl MemoryManifestStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose every read fails as if the server were unreachable.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Put a raw value under `key`.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.into(), value.into());
        }
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with(self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.insert(key, value);
        self
    }

    /// Keys read so far, in call order.
    #[must_use]
    pub fn reads(&self) -> Vec<String> {
        self.reads
            .lock()
            .map(|reads| reads.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ManifestStore for MemoryManifestStore {
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if let Ok(mut reads) = self.reads.lock() {
            reads.push(key.to_string());
        }
        if self.unavailable {
            return Err(StoreError::new(
                "get",
                io::Error::new(io::ErrorKind::ConnectionRefused, "store offline"),
            ));
        }
        Ok(self
            .values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned()))
    }
}

/// Scripted behaviour for one stored object.
#[derive(Debug, Clone)]
pub enum MemoryObject {
    /// Object body, delivered as the given chunks.
    Body(Vec<Bytes>),
    /// Open succeeds but the stream fails after yielding `prefix`.
    BreaksAfter(Bytes),
    /// Open succeeds and yields `prefix`, then the stream never ends.
    Stalls(Bytes),
    /// Open fails with a non-`NotFound` error.
    Failing,
}

/// Object store keyed by storage path. Unknown paths are `NotFound`.
#[derive(Debug, Default)]
pub struct MemoryObjectFetcher {
    objects: HashMap<String, MemoryObject>,
    opened: Mutex<Vec<String>>,
}

impl MemoryObjectFetcher {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object whose body is `contents`, delivered in one chunk.
    #[must_use]
    pub fn with_object(mut self, path: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        self.objects
            .insert(path.into(), MemoryObject::Body(vec![contents.into()]));
        self
    }

    /// Add an object with explicit scripted behaviour.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, object: MemoryObject) -> Self {
        self.objects.insert(path.into(), object);
        self
    }

    /// Storage paths opened so far, in call order.
    #[must_use]
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .map(|opened| opened.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectFetcher for MemoryObjectFetcher {
    async fn open(&self, storage_path: &str) -> Result<ObjectStream, FetchError> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(storage_path.to_string());
        }
        match self.objects.get(storage_path) {
            Some(MemoryObject::Body(chunks)) => {
                let chunks: Vec<io::Result<Bytes>> = chunks.iter().cloned().map(Ok).collect();
                Ok(stream::iter(chunks).boxed())
            }
            Some(MemoryObject::BreaksAfter(prefix)) => {
                let chunks = vec![
                    Ok(prefix.clone()),
                    Err(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "stream reset",
                    )),
                ];
                Ok(stream::iter(chunks).boxed())
            }
            Some(MemoryObject::Stalls(prefix)) => {
                let head = stream::iter([Ok::<Bytes, io::Error>(prefix.clone())]);
                Ok(head.chain(stream::pending()).boxed())
            }
            Some(MemoryObject::Failing) => Err(FetchError::failed(
                storage_path,
                io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
            )),
            None => Err(FetchError::NotFound {
                path: storage_path.to_string(),
            }),
        }
    }
}
