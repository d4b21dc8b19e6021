//! Token to manifest resolution against the lookup store.
//!
//! # Design
//! - Exactly one store read per call; no retries, no caching, so revoking a
//!   token takes effect on the next request.
//! - Absent and empty values are both "not found"; decode failures are their
//!   own outcome so the caller can log them distinctly.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ResolutionError, StoreError};
use crate::model::{FileDescriptor, Manifest};

/// Namespace prefix separating manifest keys from other uses of the store.
pub const MANIFEST_KEY_PREFIX: &str = "zip:";

/// Build the namespaced lookup key for `token`.
#[must_use]
pub fn manifest_key(token: &str) -> String {
    format!("{MANIFEST_KEY_PREFIX}{token}")
}

/// Key-value store holding serialised manifests.
#[async_trait]
pub trait ManifestStore: Send + Sync {
    /// Fetch the raw value stored under `key`, or `None` when absent.
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Resolves tokens to manifests using a shared [`ManifestStore`].
#[derive(Clone)]
pub struct ManifestResolver {
    store: Arc<dyn ManifestStore>,
}

impl ManifestResolver {
    /// Create a resolver backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ManifestStore>) -> Self {
        Self { store }
    }

    /// Resolve `token` into its ordered manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::StoreUnavailable`] when the store read fails,
    /// [`ResolutionError::TokenNotFound`] when no value (or an empty value) is
    /// stored, and [`ResolutionError::MalformedManifest`] when the value does
    /// not decode into a descriptor list.
    pub async fn resolve(&self, token: &str) -> Result<Manifest, ResolutionError> {
        let key = manifest_key(token);
        let payload = self
            .store
            .fetch(&key)
            .await
            .map_err(|source| ResolutionError::StoreUnavailable { source })?;

        let Some(payload) = payload.filter(|bytes| !bytes.is_empty()) else {
            return Err(ResolutionError::TokenNotFound);
        };

        let manifest = decode_manifest(&payload)?;
        debug!(descriptors = manifest.len(), "resolved manifest");
        Ok(manifest)
    }
}

/// Decode a persisted manifest payload.
///
/// A JSON `null` is an empty list, matching what the token issuer writes for
/// a token with no files. A `null` element decodes to an empty descriptor,
/// which the archive later skips.
///
/// # Errors
///
/// Returns [`ResolutionError::MalformedManifest`] when the payload is not a
/// JSON list of descriptor objects.
pub fn decode_manifest(payload: &[u8]) -> Result<Manifest, ResolutionError> {
    let descriptors: Option<Vec<Option<FileDescriptor>>> = serde_json::from_slice(payload)
        .map_err(|source| ResolutionError::MalformedManifest { source })?;
    Ok(descriptors
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect::<Vec<_>>()
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        values: HashMap<String, Vec<u8>>,
        fail: bool,
        keys: Mutex<Vec<String>>,
    }

    impl RecordingStore {
        fn with(key: &str, value: &str) -> Self {
            let mut values = HashMap::new();
            values.insert(key.to_string(), value.as_bytes().to_vec());
            Self {
                values,
                ..Self::default()
            }
        }

        fn keys(&self) -> Vec<String> {
            self.keys
                .lock()
                .map(|keys| keys.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl ManifestStore for RecordingStore {
        async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            if let Ok(mut keys) = self.keys.lock() {
                keys.push(key.to_string());
            }
            if self.fail {
                return Err(StoreError::new("get", io::Error::other("connection refused")));
            }
            Ok(self.values.get(key).cloned())
        }
    }

    #[test]
    fn manifest_key_is_namespaced() {
        assert_eq!(manifest_key("tok1"), "zip:tok1");
    }

    #[tokio::test]
    async fn resolve_decodes_descriptors_in_order() -> anyhow::Result<()> {
        let store = Arc::new(RecordingStore::with(
            "zip:tok1",
            r#"[{"FileName":"a.txt","Folder":"","S3Path":"obj/a"},
                {"FileName":"b?.txt","Folder":"docs","S3Path":"obj/b"}]"#,
        ));
        let resolver = ManifestResolver::new(store.clone());

        let manifest = resolver.resolve("tok1").await?;
        let paths: Vec<_> = manifest
            .descriptors()
            .iter()
            .map(|descriptor| descriptor.storage_path.as_str())
            .collect();
        assert_eq!(paths, ["obj/a", "obj/b"]);
        assert_eq!(store.keys(), ["zip:tok1"]);
        Ok(())
    }

    #[tokio::test]
    async fn resolve_reports_missing_and_empty_values_as_not_found() {
        let resolver = ManifestResolver::new(Arc::new(RecordingStore::default()));
        assert!(matches!(
            resolver.resolve("unknown").await,
            Err(ResolutionError::TokenNotFound)
        ));

        let resolver = ManifestResolver::new(Arc::new(RecordingStore::with("zip:blank", "")));
        assert!(matches!(
            resolver.resolve("blank").await,
            Err(ResolutionError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn resolve_reports_store_failures_as_unavailable() {
        let store = RecordingStore {
            fail: true,
            ..RecordingStore::default()
        };
        let resolver = ManifestResolver::new(Arc::new(store));
        let err = resolver.resolve("tok1").await.err();
        assert!(matches!(
            err,
            Some(ResolutionError::StoreUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn resolve_reports_undecodable_values_as_malformed() {
        for payload in ["not json", r#"{"S3Path":"obj/a"}"#, "[1, 2]"] {
            let resolver =
                ManifestResolver::new(Arc::new(RecordingStore::with("zip:bad", payload)));
            assert!(
                matches!(
                    resolver.resolve("bad").await,
                    Err(ResolutionError::MalformedManifest { .. })
                ),
                "payload {payload:?} should be malformed"
            );
        }
    }

    #[tokio::test]
    async fn resolve_treats_null_as_an_empty_manifest() -> anyhow::Result<()> {
        let resolver = ManifestResolver::new(Arc::new(RecordingStore::with("zip:none", "null")));
        assert!(resolver.resolve("none").await?.is_empty());
        Ok(())
    }

    #[test]
    fn decode_leaves_null_fields_empty() -> Result<(), ResolutionError> {
        let manifest =
            decode_manifest(br#"[{"FileName":"a.txt","Folder":null,"S3Path":"obj/a"}, null]"#)?;
        assert_eq!(
            manifest.descriptors(),
            [
                FileDescriptor::new("obj/a", "a.txt", ""),
                FileDescriptor::default()
            ]
        );
        Ok(())
    }

    #[test]
    fn decode_accepts_lower_camel_keys() -> Result<(), ResolutionError> {
        let manifest = decode_manifest(
            br#"[{"fileName":"a.txt","folder":"docs","s3Path":"obj/a"},
                {"filename":"b.txt","s3path":"obj/b"}]"#,
        )?;
        assert_eq!(
            manifest.descriptors(),
            [
                FileDescriptor::new("obj/a", "a.txt", "docs"),
                FileDescriptor::new("obj/b", "b.txt", "")
            ]
        );
        Ok(())
    }
}
