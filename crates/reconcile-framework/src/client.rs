//! # Store Client
//!
//! This module defines the client half of the in-memory store.

use crate::entity::{ObjectKey, Reconcilable};
use crate::error::StoreError;
use crate::message::ResourceRequest;
use crate::store::ResourceStore;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// ## ResourceClient
///
/// The `ResourceClient<T>` provides a type‑safe, async API for talking to a `ResourceActor<T>`.
/// It forwards requests over a Tokio mpsc channel and returns results via oneshot channels.
///
/// * **Cloneable** – holds only a sender, so cloning is inexpensive.
/// * **Store contract** – implements [`ResourceStore`], so anything written against the trait
///   (the trigger, the poller, the orchestrator) runs unchanged against it.
/// * **Controller surface** – additionally exposes `create`, `list` and `update_status`, which the
///   reconciliation core never calls.
#[derive(Clone)]
pub struct ResourceClient<T: Reconcilable> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Reconcilable> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R, StoreError>>) -> ResourceRequest<T>,
    ) -> Result<R, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    pub async fn create(&self, object: T) -> Result<T, StoreError> {
        self.request(|respond_to| ResourceRequest::Create { object, respond_to })
            .await
    }

    pub async fn list(&self) -> Result<Vec<T>, StoreError> {
        self.request(|respond_to| ResourceRequest::List { respond_to })
            .await
    }

    pub async fn update_status(&self, object: T) -> Result<T, StoreError> {
        self.request(|respond_to| ResourceRequest::UpdateStatus { object, respond_to })
            .await
    }
}

#[async_trait]
impl<T: Reconcilable> ResourceStore<T> for ResourceClient<T> {
    async fn get(&self, key: &ObjectKey) -> Result<T, StoreError> {
        let key = key.clone();
        self.request(|respond_to| ResourceRequest::Get { key, respond_to })
            .await
    }

    async fn update(&self, object: T) -> Result<T, StoreError> {
        self.request(|respond_to| ResourceRequest::Update { object, respond_to })
            .await
    }
}
