//! # Errors
//!
//! This module defines the error types used throughout the reconciliation framework.
//! [`StoreError`] covers the resource store boundary; [`ReconcileError`] is the
//! taxonomy surfaced to the caller of a reconciliation.

use crate::entity::ObjectKey;
use std::fmt;

/// Errors returned by a [`ResourceStore`](crate::ResourceStore).
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    #[error(
        "Operation cannot be fulfilled on {key}: the object has been modified \
         (resource version {given:?}, current {current:?})"
    )]
    Conflict {
        key: String,
        given: String,
        current: String,
    },
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// The wait phase that was in progress when a deadline elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPhase {
    /// The controller never acknowledged the request.
    Handled,
    /// The request was acknowledged but reconciliation never finished.
    Ready,
}

impl fmt::Display for WaitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitPhase::Handled => f.write_str("handled"),
            WaitPhase::Ready => f.write_str("ready"),
        }
    }
}

/// Every way a reconciliation request can end other than success.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ReconcileError {
    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: ObjectKey },

    #[error("{kind} {key}: resource is suspended")]
    Suspended { kind: &'static str, key: ObjectKey },

    #[error("failed to annotate {kind} {key}: still conflicting after {attempts} attempts")]
    ConflictExhausted {
        kind: &'static str,
        key: ObjectKey,
        attempts: u32,
    },

    #[error("store error: {0}")]
    Store(#[source] StoreError),

    #[error("failed to fetch {kind} {key} while waiting: {source}")]
    PollFetch {
        kind: &'static str,
        key: ObjectKey,
        #[source]
        source: StoreError,
    },

    #[error("timed out waiting for {kind} {key} reconciliation ({phase} phase)")]
    TimedOut {
        kind: &'static str,
        key: ObjectKey,
        phase: WaitPhase,
    },

    /// The controller reported `Ready=False`; the message is its own.
    #[error("{0}")]
    Failed(String),
}

impl ReconcileError {
    /// Maps a store error from a direct fetch or write of `key`.
    pub fn from_store(kind: &'static str, key: &ObjectKey, error: StoreError) -> Self {
        match error {
            StoreError::NotFound(_) => ReconcileError::NotFound {
                kind,
                key: key.clone(),
            },
            other => ReconcileError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_message_is_verbatim() {
        let err = ReconcileError::Failed("fetch failed".to_string());
        assert_eq!(err.to_string(), "fetch failed");
    }

    #[test]
    fn test_timed_out_names_phase() {
        let err = ReconcileError::TimedOut {
            kind: "Bucket",
            key: ObjectKey::new("flux-system", "podinfo"),
            phase: WaitPhase::Handled,
        };
        assert_eq!(
            err.to_string(),
            "timed out waiting for Bucket flux-system/podinfo reconciliation (handled phase)"
        );
    }

    #[test]
    fn test_from_store_maps_not_found() {
        let key = ObjectKey::new("default", "missing");
        let err = ReconcileError::from_store(
            "Bucket",
            &key,
            StoreError::NotFound(key.to_string()),
        );
        assert!(matches!(err, ReconcileError::NotFound { .. }));

        let err = ReconcileError::from_store("Bucket", &key, StoreError::ActorClosed);
        assert_eq!(err, ReconcileError::Store(StoreError::ActorClosed));
    }
}
