#![allow(dead_code)]

use async_trait::async_trait;
use reconcile_framework::{
    Artifact, Condition, ObjectKey, ObjectMeta, Reconcilable, ReconcileStatus, ResourceActor,
    ResourceClient, ResourceStore, StoreError, RECONCILE_REQUEST_ANNOTATION,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

// --- Test Kind ---

#[derive(Clone, Debug, PartialEq)]
pub struct Source {
    pub meta: ObjectMeta,
    pub spec: SourceSpec,
    pub status: ReconcileStatus,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SourceSpec {
    pub url: String,
    pub suspend: bool,
}

impl Source {
    pub fn new(name: &str) -> Self {
        Self {
            meta: ObjectMeta::new("flux-system", name),
            spec: SourceSpec {
                url: "https://example.com/podinfo.tar.gz".to_string(),
                suspend: false,
            },
            status: ReconcileStatus::default(),
        }
    }

    pub fn paused(name: &str) -> Self {
        let mut source = Self::new(name);
        source.spec.suspend = true;
        source
    }

    pub fn marker(&self) -> Option<&str> {
        self.meta.annotation(RECONCILE_REQUEST_ANNOTATION)
    }
}

impl Reconcilable for Source {
    const KIND: &'static str = "Source";
    type Spec = SourceSpec;

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }

    fn spec(&self) -> &SourceSpec {
        &self.spec
    }

    fn status(&self) -> &ReconcileStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut ReconcileStatus {
        &mut self.status
    }

    fn suspended(&self) -> bool {
        self.spec.suspend
    }
}

/// Spawns a store actor seeded with `objects`.
pub async fn start_store(objects: Vec<Source>) -> ResourceClient<Source> {
    let (actor, client) = ResourceActor::<Source>::new(32);
    tokio::spawn(actor.run());
    for object in objects {
        client.create(object).await.unwrap();
    }
    client
}

// --- Conflict Injection ---

/// Fails the first `conflicts` updates with a conflict and forwards the rest.
pub struct ConflictingStore {
    inner: ResourceClient<Source>,
    conflicts: u32,
    gets: AtomicU32,
    updates: AtomicU32,
}

impl ConflictingStore {
    pub fn new(inner: ResourceClient<Source>, conflicts: u32) -> Self {
        Self {
            inner,
            conflicts,
            gets: AtomicU32::new(0),
            updates: AtomicU32::new(0),
        }
    }

    pub fn gets(&self) -> u32 {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> u32 {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceStore<Source> for ConflictingStore {
    async fn get(&self, key: &ObjectKey) -> Result<Source, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn update(&self, object: Source) -> Result<Source, StoreError> {
        let n = self.updates.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.conflicts {
            return Err(StoreError::Conflict {
                key: object.key().to_string(),
                given: object.meta.resource_version.clone(),
                current: "racing-writer".to_string(),
            });
        }
        self.inner.update(object).await
    }
}

// --- Simulated Controller ---

/// What the simulated controller reports once it picks up a request.
#[derive(Clone)]
pub enum Outcome {
    Ready { revision: String },
    Failed { message: String },
    /// Acknowledge the request but never finish it.
    Stall,
}

/// Polls `key` until a reconcile request appears, then writes `outcome` into status.
pub async fn run_controller(client: ResourceClient<Source>, key: ObjectKey, outcome: Outcome) {
    loop {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let Ok(mut object) = client.get(&key).await else {
            return;
        };
        if object.marker().is_none() {
            continue;
        }

        object.status.last_handled_reconcile_at = "2024-01-01T00:00:00Z".to_string();
        match &outcome {
            Outcome::Ready { revision } => {
                object.status.observed_generation = object.meta.generation;
                object.status.artifact = Some(Artifact {
                    revision: revision.clone(),
                    url: String::new(),
                });
                object
                    .status
                    .set_condition(Condition::ready("Succeeded", "stored artifact"));
            }
            Outcome::Failed { message } => {
                object.status.observed_generation = object.meta.generation;
                object
                    .status
                    .set_condition(Condition::not_ready("FetchFailed", message.clone()));
            }
            Outcome::Stall => {}
        }

        match client.update_status(object).await {
            Ok(_) => return,
            Err(e) if e.is_conflict() => continue,
            Err(_) => return,
        }
    }
}
