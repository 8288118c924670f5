//! # System Lifecycle
//!
//! Wires one store actor and one simulated controller per source kind, and tears them down.
//!
//! ## Startup
//!
//! ```text
//! ResourceActor<Bucket>          ◄── BucketClient ──┬── SourceController<Bucket>
//!                                                   └── Reconciler<Bucket, BucketClient>
//! ResourceActor<GitRepository>   ◄── GitRepositoryClient ── ...
//! ```
//!
//! ## Graceful Shutdown
//!
//! 1. **Signal controllers** - each controller owns the receiving half of a oneshot channel
//! 2. **Await controllers** - they exit and drop their client clones
//! 3. **Drop clients** - closes the store channels
//! 4. **Await stores** - `receiver.recv()` returns `None` and the actors finish
//!
//! A store only stops once every client clone is gone, so a [`Reconciler`] built from
//! [`SourceSystem::bucket_client`] must be dropped before [`SourceSystem::shutdown`] returns.
//!
//! [`Reconciler`]: reconcile_framework::Reconciler

use crate::clients::{BucketClient, GitRepositoryClient, SourceClient};
use crate::controller::SourceController;
use crate::error::AppError;
use crate::model::SourceObject;
use reconcile_framework::{Reconcilable, ResourceActor};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

/// Interval at which the simulated controllers look for work.
pub const DEFAULT_CONTROLLER_INTERVAL: Duration = Duration::from_millis(200);

pub struct SourceSystem {
    pub bucket_client: BucketClient,
    pub git_repository_client: GitRepositoryClient,
    controllers: Vec<(oneshot::Sender<()>, JoinHandle<()>)>,
    stores: Vec<JoinHandle<()>>,
}

impl SourceSystem {
    /// Starts the stores and the controllers, ticking every `controller_interval`.
    pub fn new(controller_interval: Duration) -> Self {
        let (bucket_actor, bucket_client) = ResourceActor::new(32);
        let (git_actor, git_client) = ResourceActor::new(32);
        let bucket_client = SourceClient::new(bucket_client);
        let git_repository_client = SourceClient::new(git_client);

        let stores = vec![
            tokio::spawn(bucket_actor.run()),
            tokio::spawn(git_actor.run()),
        ];
        let controllers = vec![
            spawn_controller(bucket_client.clone(), controller_interval),
            spawn_controller(git_repository_client.clone(), controller_interval),
        ];

        info!("Source system started");
        Self {
            bucket_client,
            git_repository_client,
            controllers,
            stores,
        }
    }

    /// Loads manifest objects into their stores. Blank namespaces become `namespace`.
    pub async fn apply(
        &self,
        objects: Vec<SourceObject>,
        namespace: &str,
    ) -> Result<usize, AppError> {
        let count = objects.len();
        for object in objects {
            match object.with_default_namespace(namespace) {
                SourceObject::Bucket(bucket) => apply_one(&self.bucket_client, bucket).await?,
                SourceObject::GitRepository(repo) => {
                    apply_one(&self.git_repository_client, repo).await?
                }
            }
        }
        info!(count, "Applied manifest");
        Ok(count)
    }

    pub async fn shutdown(self) -> Result<(), AppError> {
        for (signal, handle) in self.controllers {
            let _ = signal.send(());
            handle
                .await
                .map_err(|e| AppError::Shutdown(e.to_string()))?;
        }

        drop(self.bucket_client);
        drop(self.git_repository_client);

        for handle in self.stores {
            handle
                .await
                .map_err(|e| AppError::Shutdown(e.to_string()))?;
        }
        info!("Source system stopped");
        Ok(())
    }
}

fn spawn_controller<T>(
    client: SourceClient<T>,
    interval: Duration,
) -> (oneshot::Sender<()>, JoinHandle<()>)
where
    T: crate::controller::SourceKind,
{
    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(SourceController::new(client, interval).run(rx));
    (tx, handle)
}

async fn apply_one<T: Reconcilable>(client: &SourceClient<T>, object: T) -> Result<(), AppError> {
    let name = object.key().to_string();
    client
        .apply(object)
        .await
        .map(|_| ())
        .map_err(|source| AppError::Apply {
            kind: T::KIND,
            name,
            source,
        })
}
