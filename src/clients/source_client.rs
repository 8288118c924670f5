//! # Source Client
//!
//! Provides a high-level API for interacting with a source store.
//! It wraps a `ResourceClient<T>` and adds per-request tracing.
use crate::model::{Bucket, GitRepository};
use async_trait::async_trait;
use reconcile_framework::{ObjectKey, Reconcilable, ResourceClient, ResourceStore, StoreError};
use tracing::{debug, instrument};

/// Client for one source kind's store.
#[derive(Clone)]
pub struct SourceClient<T: Reconcilable> {
    inner: ResourceClient<T>,
}

pub type BucketClient = SourceClient<Bucket>;
pub type GitRepositoryClient = SourceClient<GitRepository>;

impl<T: Reconcilable> SourceClient<T> {
    pub fn new(inner: ResourceClient<T>) -> Self {
        Self { inner }
    }

    /// Adds a new object to the store.
    #[instrument(skip_all, fields(kind = T::KIND, key = %object.key()))]
    pub async fn apply(&self, object: T) -> Result<T, StoreError> {
        debug!("Sending request");
        self.inner.create(object).await
    }

    pub async fn list(&self) -> Result<Vec<T>, StoreError> {
        self.inner.list().await
    }

    #[instrument(skip_all, fields(kind = T::KIND, key = %object.key()))]
    pub async fn update_status(&self, object: T) -> Result<T, StoreError> {
        debug!("Sending request");
        self.inner.update_status(object).await
    }
}

#[async_trait]
impl<T: Reconcilable> ResourceStore<T> for SourceClient<T> {
    #[instrument(skip(self), fields(kind = T::KIND))]
    async fn get(&self, key: &ObjectKey) -> Result<T, StoreError> {
        debug!("Sending request");
        self.inner.get(key).await
    }

    #[instrument(skip_all, fields(kind = T::KIND, key = %object.key()))]
    async fn update(&self, object: T) -> Result<T, StoreError> {
        debug!("Sending request");
        self.inner.update(object).await
    }
}
