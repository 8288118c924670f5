//! # Reconciliation Orchestrator
//!
//! Sequences the trigger, the two waits and the final evaluation into one request-and-wait
//! operation.
//!
//! ## The Protocol
//!
//! ```text
//! Init        get object ─── suspended? ──────────────────────────► Suspended
//!             capture baseline = status.last_handled_reconcile_at
//! Trigger     request_reconciliation ─── error ────────────────────► NotFound / ConflictExhausted / Store
//! WaitHandled poll until last_handled_reconcile_at != baseline ───► TimedOut(handled) / PollFetch
//! WaitReady   poll until readiness_state != Pending ──────────────► TimedOut(ready) / PollFetch
//! Evaluate    Ready ─► Ok(Reconciled)      Failed(msg) ─► Failed(msg)
//! ```
//!
//! One deadline, `start + timeout`, bounds the whole sequence: trigger retries and both
//! waits draw from the same budget.

use crate::entity::{ObjectKey, Reconcilable};
use crate::error::{ReconcileError, StoreError, WaitPhase};
use crate::poll::{poll_until, PollError};
use crate::readiness::{handled, readiness_state, Readiness};
use crate::store::ResourceStore;
use crate::trigger::{request_reconciliation, Backoff};
use std::marker::PhantomData;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

/// Stand-in deadline for timeouts too large to add to the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Returns `now + timeout`, saturating to [`FAR_FUTURE`] instead of overflowing.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Tunables for one reconciliation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOptions {
    /// Sleep between status checks.
    pub poll_interval: Duration,
    /// Budget for the whole operation.
    pub timeout: Duration,
    /// Retry schedule for conflicting annotation writes.
    pub backoff: Backoff,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(5 * 60),
            backoff: Backoff::default(),
        }
    }
}

/// A finished, successful reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub key: ObjectKey,
    /// Artifact revision reported by the controller, when the kind produces one.
    pub revision: Option<String>,
}

/// Requests a reconciliation and waits for the controller to finish it.
///
/// Generic over the resource kind `T` and the store `S`, so the same protocol drives
/// every kind against any store.
///
/// ```rust,ignore
/// let reconciler = Reconciler::new(bucket_client, ReconcileOptions::default());
/// let done = reconciler.reconcile(&ObjectKey::new("flux-system", "podinfo")).await?;
/// println!("fetched revision {}", done.revision.unwrap_or_default());
/// ```
pub struct Reconciler<T, S> {
    store: S,
    options: ReconcileOptions,
    _kind: PhantomData<fn() -> T>,
}

impl<T, S> Reconciler<T, S>
where
    T: Reconcilable,
    S: ResourceStore<T>,
{
    pub fn new(store: S, options: ReconcileOptions) -> Self {
        Self {
            store,
            options,
            _kind: PhantomData,
        }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Runs the protocol once for `key`.
    #[instrument(name = "reconcile", skip_all, fields(kind = T::KIND, key = %key))]
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<Reconciled, ReconcileError> {
        let deadline = deadline_after(self.options.timeout);

        let object = self
            .store
            .get(key)
            .await
            .map_err(|e| ReconcileError::from_store(T::KIND, key, e))?;

        if object.suspended() {
            warn!("Resource is suspended, not requesting reconciliation");
            return Err(ReconcileError::Suspended {
                kind: T::KIND,
                key: key.clone(),
            });
        }

        // Captured before the trigger write; see `readiness::handled`.
        let baseline = object.status().last_handled_reconcile_at.clone();

        info!(namespace = %key.namespace, "Annotating {}", T::KIND);
        let marker =
            request_reconciliation::<T, S>(&self.store, key, &self.options.backoff, deadline)
                .await?;
        info!(%marker, "{} annotated", T::KIND);

        info!("Waiting for {} reconciliation", T::KIND);
        self.wait(key, WaitPhase::Handled, deadline, |object| {
            handled(object, &baseline)
        })
        .await?;

        let object = self
            .wait(key, WaitPhase::Ready, deadline, |object| {
                readiness_state(object) != Readiness::Pending
            })
            .await?;

        match readiness_state(&object) {
            Readiness::Ready => {
                let revision = object.artifact_revision().map(str::to_string);
                info!(
                    revision = revision.as_deref().unwrap_or(""),
                    "{} reconciliation completed",
                    T::KIND
                );
                Ok(Reconciled {
                    key: key.clone(),
                    revision,
                })
            }
            Readiness::Failed(message) => {
                warn!(%message, "{} reconciliation failed", T::KIND);
                Err(ReconcileError::Failed(message))
            }
            // The ready wait only returns a non-pending snapshot.
            Readiness::Pending => Err(ReconcileError::TimedOut {
                kind: T::KIND,
                key: key.clone(),
                phase: WaitPhase::Ready,
            }),
        }
    }

    async fn wait(
        &self,
        key: &ObjectKey,
        phase: WaitPhase,
        deadline: Instant,
        mut condition: impl FnMut(&T) -> bool,
    ) -> Result<T, ReconcileError> {
        poll_until(
            || self.store.get(key),
            |object| Ok::<_, StoreError>(condition(object)),
            self.options.poll_interval,
            deadline,
        )
        .await
        .map_err(|e| match e {
            PollError::Timeout => {
                warn!(%phase, "Deadline elapsed while waiting");
                ReconcileError::TimedOut {
                    kind: T::KIND,
                    key: key.clone(),
                    phase,
                }
            }
            PollError::Failed(source) => ReconcileError::PollFetch {
                kind: T::KIND,
                key: key.clone(),
                source,
            },
        })
    }
}
