//! The `source` command: load the manifest, start the system, reconcile one source.

use crate::cli::{Cli, Command, SourceCommand};
use crate::config::Config;
use crate::error::AppError;
use crate::lifecycle::{SourceSystem, DEFAULT_CONTROLLER_INTERVAL};
use crate::model::{load_manifest, Bucket, GitRepository};
use reconcile_framework::{
    ObjectKey, Reconcilable, ReconcileOptions, Reconciled, Reconciler, ResourceStore,
};
use tracing::{info, warn, Instrument};

/// Runs the parsed command line to completion, shutting the system down either way.
pub async fn run(cli: Cli) -> Result<Reconciled, AppError> {
    let config = Config::load(cli.config.as_deref())?.with_overrides(
        cli.namespace,
        cli.poll_interval,
        cli.timeout,
    );
    let objects = load_manifest(&cli.manifest)?;

    let system = SourceSystem::new(DEFAULT_CONTROLLER_INTERVAL);
    let result = async {
        system.apply(objects, &config.namespace).await?;
        let options = config.reconcile_options();
        let Command::Source { kind } = cli.command;
        match kind {
            SourceCommand::Bucket { name } => {
                let key = ObjectKey::new(config.namespace.clone(), name);
                let store = system.bucket_client.clone();
                reconcile_source::<Bucket, _>(store, &key, options).await
            }
            SourceCommand::Git { name } => {
                let key = ObjectKey::new(config.namespace.clone(), name);
                let store = system.git_repository_client.clone();
                reconcile_source::<GitRepository, _>(store, &key, options).await
            }
        }
    }
    .await;

    let shutdown = system.shutdown().await;
    finish(result, shutdown)
}

/// Combines the command result with the shutdown result. A reconcile failure wins.
fn finish(
    result: Result<Reconciled, AppError>,
    shutdown: Result<(), AppError>,
) -> Result<Reconciled, AppError> {
    match (result, shutdown) {
        (Ok(done), Ok(())) => Ok(done),
        (Ok(_), Err(e)) | (Err(e), Ok(())) => Err(e),
        (Err(e), Err(shutdown_err)) => {
            warn!(error = %shutdown_err, "Shutdown failed");
            Err(e)
        }
    }
}

/// Requests a reconciliation of `key` through `store` and waits for the outcome.
pub async fn reconcile_source<T, S>(
    store: S,
    key: &ObjectKey,
    options: ReconcileOptions,
) -> Result<Reconciled, AppError>
where
    T: Reconcilable,
    S: ResourceStore<T>,
{
    let span = tracing::info_span!("source", kind = T::KIND);
    async {
        info!(%key, timeout = ?options.timeout, "Requesting reconciliation");
        let reconciler = Reconciler::new(store, options);
        Ok(reconciler.reconcile(key).await?)
    }
    .instrument(span)
    .await
}
