use reconcile_framework::{ObjectMeta, Reconcilable, ReconcileStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An S3-compatible bucket the source controller packages into an artifact.
///
/// # Reconciliation
/// This struct implements [`Reconcilable`], so it can be stored in a
/// [`ResourceActor`](reconcile_framework::ResourceActor) and driven by a
/// [`Reconciler`](reconcile_framework::Reconciler).
///
/// Only `spec` changes bump `metadata.generation`; the trigger annotation does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub metadata: ObjectMeta,
    pub spec: BucketSpec,
    #[serde(default)]
    pub status: ReconcileStatus,
}

/// Desired state of a [`Bucket`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSpec {
    pub bucket_name: String,
    pub endpoint: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_interval", with = "crate::config::humantime_serde")]
    pub interval: Duration,
    #[serde(default)]
    pub suspend: bool,
}

fn default_provider() -> String {
    "generic".to_string()
}

fn default_interval() -> Duration {
    Duration::from_secs(5 * 60)
}

impl Bucket {
    /// Creates a Bucket with the generic provider and a five minute interval.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        bucket_name: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            spec: BucketSpec {
                bucket_name: bucket_name.into(),
                endpoint: endpoint.into(),
                provider: default_provider(),
                interval: default_interval(),
                suspend: false,
            },
            status: ReconcileStatus::default(),
        }
    }
}

impl Reconcilable for Bucket {
    const KIND: &'static str = "Bucket";
    type Spec = BucketSpec;

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn spec(&self) -> &BucketSpec {
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
