//! # ResourceStore Trait
//!
//! The boundary between the reconciliation core and whatever holds the objects.
//! The core needs exactly two operations: fetch one object by key, and write it back.
use crate::entity::{ObjectKey, Reconcilable};
use crate::error::StoreError;
use async_trait::async_trait;

/// Fetch/update contract for a single named resource.
///
/// # Contract
///
/// * `get` fails with [`StoreError::NotFound`] when the object does not exist.
/// * `update` fails with [`StoreError::Conflict`] when the object changed since the
///   caller fetched it (the caller's `resource_version` is stale).
///
/// [`ResourceClient`](crate::ResourceClient) implements this for the in-memory store,
/// and [`MockStore`](crate::mock::MockStore) hands out a client with scripted responses.
/// An adapter for a real API server implements the same two methods.
#[async_trait]
pub trait ResourceStore<T: Reconcilable>: Send + Sync {
    /// Fetch the latest snapshot of `key`.
    async fn get(&self, key: &ObjectKey) -> Result<T, StoreError>;

    /// Write `object` back, guarded by its `resource_version`.
    async fn update(&self, object: T) -> Result<T, StoreError>;
}

