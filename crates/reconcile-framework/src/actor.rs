//! # In-Memory Resource Store
//!
//! This module defines the `ResourceActor`, an in-memory stand-in for the remote object store.
//! It implements the "Server" side of the Actor Model, processing requests sequentially
//! and enforcing optimistic concurrency on every write.

use crate::client::ResourceClient;
use crate::entity::{ObjectKey, Reconcilable};
use crate::error::StoreError;
use crate::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The actor that owns every object of one kind.
///
/// # Architecture Note
/// This struct is the "Server" half of the store. It owns the objects and the receiver
/// end of the channel, and processes requests one at a time, so the map itself needs
/// no lock.
///
/// That does **not** make concurrent *clients* safe. Two clients can both read version
/// `"4"`, modify their copy, and write it back. The first write wins and moves the object
/// to version `"5"`; the second is rejected with [`StoreError::Conflict`] and must re-read.
/// This read-check-write discipline is the only concurrency control the store offers.
///
/// ## Operations
///
/// * **Create**: rejects duplicates, sets `generation = 1`, assigns a fresh `resource_version`.
/// * **Get**: returns a clone, or `NotFound`.
/// * **List**: returns clones of all objects, ordered by key.
/// * **Update**: version check, then replaces metadata and spec. Status is kept from the
///   stored object. `generation` is incremented only when the spec changed.
/// * **UpdateStatus**: version check, then replaces status only.
///
/// ```rust
/// use reconcile_framework::{ResourceActor, ResourceStore};
/// # use reconcile_framework::{ObjectMeta, Reconcilable, ReconcileStatus};
/// # #[derive(Clone, Debug)]
/// # struct Widget { meta: ObjectMeta, spec: u32, status: ReconcileStatus }
/// # impl Reconcilable for Widget {
/// #     const KIND: &'static str = "Widget";
/// #     type Spec = u32;
/// #     fn meta(&self) -> &ObjectMeta { &self.meta }
/// #     fn meta_mut(&mut self) -> &mut ObjectMeta { &mut self.meta }
/// #     fn spec(&self) -> &u32 { &self.spec }
/// #     fn status(&self) -> &ReconcileStatus { &self.status }
/// #     fn status_mut(&mut self) -> &mut ReconcileStatus { &mut self.status }
/// #     fn suspended(&self) -> bool { false }
/// # }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Widget>::new(10);
///     tokio::spawn(actor.run());
///
///     let widget = Widget { meta: ObjectMeta::new("default", "w"), spec: 1, status: Default::default() };
///     let created = client.create(widget).await.unwrap();
///     assert_eq!(created.meta.generation, 1);
///
///     let mut changed = created.clone();
///     changed.spec = 2;
///     let updated = client.update(changed).await.unwrap();
///     assert_eq!(updated.meta.generation, 2);
///
///     // A write based on the old version is rejected.
///     assert!(client.update(created).await.unwrap_err().is_conflict());
/// }
/// ```
pub struct ResourceActor<T: Reconcilable> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<ObjectKey, T>,
    next_version: u64,
}

impl<T: Reconcilable> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_version: 1,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    pub async fn run(mut self) {
        let kind = T::KIND;
        info!(kind, "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { object, respond_to } => {
                    let result = self.create(object);
                    match &result {
                        Ok(created) => {
                            info!(kind, key = %created.key(), size = self.store.len(), "Created")
                        }
                        Err(e) => warn!(kind, error = %e, "Create failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { key, respond_to } => {
                    let item = self.store.get(&key).cloned();
                    debug!(kind, %key, found = item.is_some(), "Get");
                    let _ = respond_to.send(item.ok_or_else(|| StoreError::NotFound(key.to_string())));
                }
                ResourceRequest::List { respond_to } => {
                    let mut items: Vec<T> = self.store.values().cloned().collect();
                    items.sort_by_key(|item| item.key());
                    debug!(kind, size = items.len(), "List");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { object, respond_to } => {
                    let key = object.key();
                    let result = self.update(object);
                    match &result {
                        Ok(updated) => debug!(
                            kind,
                            %key,
                            generation = updated.meta().generation,
                            resource_version = %updated.meta().resource_version,
                            "Updated"
                        ),
                        Err(e) => warn!(kind, %key, error = %e, "Update failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::UpdateStatus { object, respond_to } => {
                    let key = object.key();
                    let result = self.update_status(object);
                    match &result {
                        Ok(updated) => debug!(
                            kind,
                            %key,
                            resource_version = %updated.meta().resource_version,
                            "Status updated"
                        ),
                        Err(e) => warn!(kind, %key, error = %e, "Status update failed"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(kind, size = self.store.len(), "Shutdown");
    }

    fn issue_version(&mut self) -> String {
        let version = self.next_version;
        self.next_version += 1;
        version.to_string()
    }

    fn create(&mut self, mut object: T) -> Result<T, StoreError> {
        let key = object.key();
        if self.store.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        let version = self.issue_version();
        let meta = object.meta_mut();
        meta.generation = 1;
        meta.resource_version = version;
        self.store.insert(key, object.clone());
        Ok(object)
    }

    fn update(&mut self, mut object: T) -> Result<T, StoreError> {
        let key = object.key();
        let current = self
            .store
            .get(&key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        check_version(&key, current, &object)?;

        let mut generation = current.meta().generation;
        if current.spec() != object.spec() {
            generation += 1;
        }
        *object.status_mut() = current.status().clone();

        let version = self.issue_version();
        let meta = object.meta_mut();
        meta.generation = generation;
        meta.resource_version = version;
        self.store.insert(key, object.clone());
        Ok(object)
    }

    fn update_status(&mut self, object: T) -> Result<T, StoreError> {
        let key = object.key();
        let current = self
            .store
            .get(&key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        check_version(&key, current, &object)?;

        let mut stored = current.clone();
        *stored.status_mut() = object.status().clone();
        stored.meta_mut().resource_version = self.issue_version();
        self.store.insert(key, stored.clone());
        Ok(stored)
    }
}

fn check_version<T: Reconcilable>(key: &ObjectKey, current: &T, incoming: &T) -> Result<(), StoreError> {
    let given = &incoming.meta().resource_version;
    let stored = &current.meta().resource_version;
    if given != stored {
        return Err(StoreError::Conflict {
            key: key.to_string(),
            given: given.clone(),
            current: stored.clone(),
        });
    }
    Ok(())
}
