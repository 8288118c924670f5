use reconcile_framework::{ObjectMeta, Reconcilable, ReconcileStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A Git repository the source controller checks out into an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitRepository {
    pub metadata: ObjectMeta,
    pub spec: GitRepositorySpec,
    #[serde(default)]
    pub status: ReconcileStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositorySpec {
    pub url: String,
    #[serde(default, rename = "ref")]
    pub reference: GitReference,
    #[serde(default = "default_interval", with = "crate::config::humantime_serde")]
    pub interval: Duration,
    #[serde(default)]
    pub suspend: bool,
}

/// Which commit to check out. An empty reference means the `master` branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl GitReference {
    /// The ref name recorded in the artifact revision.
    pub fn name(&self) -> &str {
        self.tag
            .as_deref()
            .or(self.branch.as_deref())
            .unwrap_or("master")
    }
}

fn default_interval() -> Duration {
    Duration::from_secs(60)
}

impl GitRepository {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            spec: GitRepositorySpec {
                url: url.into(),
                reference: GitReference::default(),
                interval: default_interval(),
                suspend: false,
            },
            status: ReconcileStatus::default(),
        }
    }
}

impl Reconcilable for GitRepository {
    const KIND: &'static str = "GitRepository";
    type Spec = GitRepositorySpec;

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn spec(&self) -> &GitRepositorySpec {
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
