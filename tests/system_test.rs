use clap::Parser;
use flux_reconcile::cli::Cli;
use flux_reconcile::command::{reconcile_source, run};
use flux_reconcile::error::AppError;
use flux_reconcile::lifecycle::SourceSystem;
use flux_reconcile::model::{parse_manifest, Bucket, GitRepository};
use reconcile_framework::{
    ObjectKey, ReconcileError, ReconcileOptions, ResourceStore, RECONCILE_REQUEST_ANNOTATION,
};
use std::ffi::OsString;
use std::io::Write;
use std::time::Duration;

const MANIFEST: &str = r#"
kind: Bucket
metadata:
  name: podinfo
spec:
  bucketName: podinfo
  endpoint: minio.minio.svc:9000
---
kind: Bucket
metadata:
  name: broken
spec:
  bucketName: broken
  endpoint: ""
---
kind: Bucket
metadata:
  name: paused
spec:
  bucketName: paused
  endpoint: minio.minio.svc:9000
  suspend: true
---
kind: GitRepository
metadata:
  name: app
  namespace: apps
spec:
  url: https://github.com/org/app
  ref:
    tag: v1.2.0
"#;

fn options() -> ReconcileOptions {
    ReconcileOptions {
        poll_interval: Duration::from_millis(100),
        timeout: Duration::from_secs(30),
        ..ReconcileOptions::default()
    }
}

async fn start() -> SourceSystem {
    let system = SourceSystem::new(Duration::from_millis(50));
    let applied = system
        .apply(parse_manifest(MANIFEST).unwrap(), "flux-system")
        .await
        .unwrap();
    assert_eq!(applied, 4);
    system
}

#[tokio::test(start_paused = true)]
async fn test_bucket_reconciles_to_revision() {
    let system = start().await;
    let key = ObjectKey::new("flux-system", "podinfo");

    let done = reconcile_source::<Bucket, _>(system.bucket_client.clone(), &key, options())
        .await
        .unwrap();

    let revision = done.revision.unwrap();
    assert!(revision.starts_with("sha256:"), "{revision}");

    let stored = system.bucket_client.get(&key).await.unwrap();
    let marker = stored.metadata.annotation(RECONCILE_REQUEST_ANNOTATION).unwrap();
    assert_eq!(stored.status.last_handled_reconcile_at, marker);
    assert_eq!(stored.status.observed_generation, stored.metadata.generation);

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_git_repository_in_other_namespace() {
    let system = start().await;
    let key = ObjectKey::new("apps", "app");

    let done = reconcile_source::<GitRepository, _>(
        system.git_repository_client.clone(),
        &key,
        options(),
    )
    .await
    .unwrap();

    assert!(done.revision.unwrap().starts_with("v1.2.0@sha1:"));
    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_surfaces_controller_message() {
    let system = start().await;
    let key = ObjectKey::new("flux-system", "broken");

    let err = reconcile_source::<Bucket, _>(system.bucket_client.clone(), &key, options())
        .await
        .unwrap_err();

    match err {
        AppError::Reconcile(ReconcileError::Failed(message)) => {
            assert!(message.contains("'broken' bucket"), "{message}");
        }
        other => panic!("expected controller failure, got {other:?}"),
    }
    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_suspended_bucket_is_refused() {
    let system = start().await;
    let key = ObjectKey::new("flux-system", "paused");

    let err = reconcile_source::<Bucket, _>(system.bucket_client.clone(), &key, options())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Reconcile(ReconcileError::Suspended { .. })
    ));
    let stored = system.bucket_client.get(&key).await.unwrap();
    assert!(stored.metadata.annotation(RECONCILE_REQUEST_ANNOTATION).is_none());
    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_unknown_bucket_is_not_found() {
    let system = start().await;
    let key = ObjectKey::new("flux-system", "missing");

    let err = reconcile_source::<Bucket, _>(system.bucket_client.clone(), &key, options())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Bucket flux-system/missing not found");
    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_object_in_manifest_is_rejected() {
    let system = SourceSystem::new(Duration::from_millis(50));
    let mut objects = parse_manifest(MANIFEST).unwrap();
    objects.push(objects[0].clone());

    let err = system.apply(objects, "flux-system").await.unwrap_err();
    assert!(matches!(err, AppError::Apply { kind: "Bucket", .. }));
    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_run_from_command_line() {
    let mut manifest = tempfile::NamedTempFile::new().unwrap();
    manifest.write_all(MANIFEST.as_bytes()).unwrap();
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "namespace: elsewhere\npoll-interval: 100ms\ntimeout: 1m").unwrap();

    let args: Vec<OsString> = vec![
        "flux-reconcile".into(),
        "--config".into(),
        config.path().into(),
        "--manifest".into(),
        manifest.path().into(),
        "source".into(),
        "bucket".into(),
        "podinfo".into(),
        "-n".into(),
        "flux-system".into(),
    ];
    let cli = Cli::try_parse_from(args).unwrap();

    let done = run(cli).await.unwrap();
    assert_eq!(done.key, ObjectKey::new("flux-system", "podinfo"));
    assert!(done.revision.is_some());
}
