use reconcile_framework::{ReconcileError, StoreError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the `flux-reconcile` command.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to load {kind} {name}: {source}")]
    Apply {
        kind: &'static str,
        name: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("shutdown failed: {0}")]
    Shutdown(String),
}
