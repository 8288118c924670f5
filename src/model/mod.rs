//! Source kinds implementing the [`Reconcilable`](reconcile_framework::Reconcilable) trait,
//! and the manifest format they are loaded from.

pub mod bucket;
pub mod git_repository;

pub use bucket::*;
pub use git_repository::*;

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One document of a manifest, selected by its `kind` field.
///
/// ```yaml
/// apiVersion: source.toolkit.fluxcd.io/v1beta2
/// kind: Bucket
/// metadata:
///   name: podinfo
/// spec:
///   bucketName: podinfo
///   endpoint: minio.minio.svc:9000
///   interval: 5m
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SourceObject {
    Bucket(Bucket),
    GitRepository(GitRepository),
}

impl SourceObject {
    /// Fills in `namespace` on objects whose metadata leaves it blank.
    pub fn with_default_namespace(mut self, namespace: &str) -> Self {
        let meta = match &mut self {
            SourceObject::Bucket(bucket) => &mut bucket.metadata,
            SourceObject::GitRepository(repo) => &mut repo.metadata,
        };
        if meta.namespace.is_empty() {
            meta.namespace = namespace.to_string();
        }
        self
    }
}

/// Parses a multi-document YAML manifest. A `null` document is skipped.
pub fn parse_manifest(text: &str) -> Result<Vec<SourceObject>, serde_yaml::Error> {
    let mut objects = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        if let Some(object) = Option::<SourceObject>::deserialize(document)? {
            objects.push(object);
        }
    }
    Ok(objects)
}

pub fn load_manifest(path: &Path) -> Result<Vec<SourceObject>, AppError> {
    let text = std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&text).map_err(|source| AppError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const MANIFEST: &str = r#"
apiVersion: source.toolkit.fluxcd.io/v1beta2
kind: Bucket
metadata:
  name: podinfo
  namespace: apps
spec:
  bucketName: podinfo
  endpoint: minio.minio.svc:9000
  interval: 10m
---
apiVersion: source.toolkit.fluxcd.io/v1
kind: GitRepository
metadata:
  name: flux-system
spec:
  url: https://github.com/fluxcd/flux2-kustomize-helm-example
  ref:
    branch: main
  suspend: true
"#;

    #[test]
    fn test_parse_multi_document_manifest() {
        let objects = parse_manifest(MANIFEST).unwrap();
        assert_eq!(objects.len(), 2);

        let SourceObject::Bucket(bucket) = &objects[0] else {
            panic!("expected Bucket, got {:?}", objects[0]);
        };
        assert_eq!(bucket.metadata.namespace, "apps");
        assert_eq!(bucket.spec.bucket_name, "podinfo");
        assert_eq!(bucket.spec.provider, "generic");
        assert_eq!(bucket.spec.interval, Duration::from_secs(600));
        assert!(!bucket.spec.suspend);

        let SourceObject::GitRepository(repo) = &objects[1] else {
            panic!("expected GitRepository, got {:?}", objects[1]);
        };
        assert_eq!(repo.spec.reference.name(), "main");
        assert_eq!(repo.spec.interval, Duration::from_secs(60));
        assert!(repo.spec.suspend);
    }

    #[test]
    fn test_default_namespace_only_fills_blanks() {
        let objects: Vec<_> = parse_manifest(MANIFEST)
            .unwrap()
            .into_iter()
            .map(|object| object.with_default_namespace("flux-system"))
            .collect();

        let namespaces: Vec<_> = objects
            .iter()
            .map(|object| match object {
                SourceObject::Bucket(b) => b.metadata.namespace.as_str(),
                SourceObject::GitRepository(r) => r.metadata.namespace.as_str(),
            })
            .collect();
        assert_eq!(namespaces, ["apps", "flux-system"]);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = parse_manifest("kind: HelmChart\nmetadata:\n  name: x\n").unwrap_err();
        assert!(err.to_string().contains("HelmChart"), "{err}");
    }
}
