//! S3-backed object fetcher.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use object_store::ObjectStore;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use tracing::info;
use zipgate_config::ObjectStoreConfig;
use zipgate_core::{FetchError, ObjectFetcher, ObjectStream};

use crate::error::{DataError, Result};

/// Opens objects from any [`ObjectStore`], normally an S3 bucket.
#[derive(Clone)]
pub struct S3ObjectFetcher {
    store: Arc<dyn ObjectStore>,
}

impl S3ObjectFetcher {
    /// Build an S3 client for `config`.
    ///
    /// Ambient `AWS_*` variables are read first; the explicit bucket, region,
    /// static credentials and endpoint override them. Without static
    /// credentials the client uses the provider chain and refreshes
    /// instance or role credentials itself.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::ObjectStore`] when the client cannot be built.
    pub fn from_config(config: &ObjectStoreConfig) -> Result<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region);
        if let Some(credentials) = &config.credentials {
            builder = builder
                .with_access_key_id(&credentials.access_key_id)
                .with_secret_access_key(&credentials.secret_access_key);
        }
        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }
        let store = builder.build().map_err(|source| DataError::ObjectStore {
            bucket: config.bucket.clone(),
            source,
        })?;
        info!(
            bucket = %config.bucket,
            region = %config.region,
            static_credentials = config.credentials.is_some(),
            endpoint = config.endpoint.as_deref().unwrap_or("default"),
            "object store configured"
        );
        Ok(Self::new(Arc::new(store)))
    }

    /// Wrap an already configured store.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ObjectFetcher for S3ObjectFetcher {
    async fn open(&self, storage_path: &str) -> std::result::Result<ObjectStream, FetchError> {
        let location =
            Path::parse(storage_path).map_err(|err| FetchError::failed(storage_path, err))?;
        let result = self.store.get(&location).await.map_err(|err| match err {
            object_store::Error::NotFound { .. } => FetchError::NotFound {
                path: storage_path.to_string(),
            },
            other => FetchError::failed(storage_path, other),
        })?;
        Ok(result.into_stream().map_err(io::Error::other).boxed())
    }
}
