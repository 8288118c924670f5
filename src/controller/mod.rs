//! # Simulated Source Controller
//!
//! Plays the controller side of the reconcile-request protocol against the in-memory store,
//! so the command can be run end to end without a cluster.
//!
//! ## The Loop
//!
//! On every tick the controller lists its kind and, for each object that is not suspended,
//! does work when either
//!
//! - the `reconcile.fluxcd.io/requestedAt` annotation differs from
//!   `status.lastHandledReconcileAt`, or
//! - `status.observedGeneration` lags `metadata.generation`.
//!
//! It then records the handled marker, produces an artifact with [`SourceKind::fetch_artifact`]
//! and writes `Ready=True` or `Ready=False` with `observedGeneration = generation` in a single
//! status write. A write that loses a version race is dropped and redone on the next tick.

use crate::clients::SourceClient;
use crate::model::{Bucket, GitRepository};
use reconcile_framework::{
    Artifact, Condition, Reconcilable, StoreError, RECONCILE_REQUEST_ANNOTATION,
};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Kind-specific work the controller performs for one object.
pub trait SourceKind: Reconcilable {
    /// Produces the artifact for the current spec, or the failure message to report.
    fn fetch_artifact(&self) -> Result<Artifact, String>;
}

fn digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

fn artifact_url(kind: &str, meta: &reconcile_framework::ObjectMeta, file: &str) -> String {
    format!(
        "http://source-controller.flux-system.svc.cluster.local./{}/{}/{}/{}",
        kind.to_lowercase(),
        meta.namespace,
        meta.name,
        file
    )
}

impl SourceKind for Bucket {
    fn fetch_artifact(&self) -> Result<Artifact, String> {
        if self.spec.bucket_name.is_empty() {
            return Err("bucket name must not be empty".to_string());
        }
        if self.spec.endpoint.is_empty() {
            return Err(format!(
                "failed to confirm existence of '{}' bucket: no endpoint configured",
                self.spec.bucket_name
            ));
        }
        let sum = digest(&[
            &self.spec.provider,
            &self.spec.endpoint,
            &self.spec.bucket_name,
        ]);
        Ok(Artifact {
            url: artifact_url(Self::KIND, &self.metadata, &format!("{sum}.tar.gz")),
            revision: format!("sha256:{sum}"),
        })
    }
}

impl SourceKind for GitRepository {
    fn fetch_artifact(&self) -> Result<Artifact, String> {
        let url = &self.spec.url;
        let supported = ["https://", "http://", "ssh://"]
            .iter()
            .any(|scheme| url.starts_with(scheme));
        if !supported {
            return Err(format!("failed to checkout '{url}': unsupported URL scheme"));
        }
        let reference = self.spec.reference.name();
        let commit = &digest(&[url, reference])[..40];
        Ok(Artifact {
            url: artifact_url(Self::KIND, &self.metadata, &format!("{commit}.tar.gz")),
            revision: format!("{reference}@sha1:{commit}"),
        })
    }
}

/// Watches every object of kind `T` in one store.
pub struct SourceController<T: SourceKind> {
    client: SourceClient<T>,
    interval: Duration,
}

impl<T: SourceKind> SourceController<T> {
    pub fn new(client: SourceClient<T>, interval: Duration) -> Self {
        Self { client, interval }
    }

    /// Ticks until `shutdown` fires or its sender is dropped.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        info!(kind = T::KIND, interval = ?self.interval, "Source controller started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => self.tick().await,
            }
        }
        info!(kind = T::KIND, "Source controller stopped");
    }

    async fn tick(&self) {
        let objects = match self.client.list().await {
            Ok(objects) => objects,
            Err(e) => {
                warn!(kind = T::KIND, error = %e, "Failed to list sources");
                return;
            }
        };
        for object in objects {
            let key = object.key();
            match self.reconcile_object(object).await {
                Ok(_) => {}
                Err(e) if e.is_conflict() => {
                    debug!(kind = T::KIND, %key, "Status write conflicted, retrying next tick");
                }
                Err(e) => warn!(kind = T::KIND, %key, error = %e, "Status write failed"),
            }
        }
    }

    /// Handles one object. Returns whether a status write was made.
    pub async fn reconcile_object(&self, object: T) -> Result<bool, StoreError> {
        if object.suspended() {
            return Ok(false);
        }

        let status = object.status();
        let requested = object
            .meta()
            .annotation(RECONCILE_REQUEST_ANNOTATION)
            .map(str::to_string);
        let request_pending = requested
            .as_deref()
            .is_some_and(|marker| marker != status.last_handled_reconcile_at);
        let generation = object.meta().generation;
        if !request_pending && status.observed_generation == generation {
            return Ok(false);
        }

        let mut updated = object.clone();
        let status = updated.status_mut();
        if let Some(marker) = requested {
            status.last_handled_reconcile_at = marker;
        }
        match object.fetch_artifact() {
            Ok(artifact) => {
                info!(kind = T::KIND, key = %object.key(), revision = %artifact.revision, "Stored artifact");
                status.set_condition(Condition::ready(
                    "Succeeded",
                    format!("stored artifact for revision '{}'", artifact.revision),
                ));
                status.artifact = Some(artifact);
            }
            Err(message) => {
                warn!(kind = T::KIND, key = %object.key(), %message, "Fetch failed");
                status.set_condition(Condition::not_ready("FetchFailed", message));
            }
        }
        status.observed_generation = generation;

        self.client.update_status(updated).await?;
        Ok(true)
    }
}
