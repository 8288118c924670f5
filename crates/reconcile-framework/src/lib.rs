//! # Reconcile Framework
//!
//! This crate provides the building blocks for **requesting an out-of-band reconciliation** of a
//! controller-managed resource and **waiting** until the controller has acknowledged and finished it.
//!
//! ## The Problem
//!
//! Two independent actors mutate the same object:
//!
//! - the **client** writes a trigger annotation (`reconcile.fluxcd.io/requestedAt`),
//! - the **controller** consumes the trigger, does its work, and reports status.
//!
//! The client has to tell "not yet seen", "in progress", "succeeded" and "failed" apart, under
//! optimistic-concurrency writes, without false positives, and within one bounded wait.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into four layers:
//!
//! 1. **Resource Layer** ([`Reconcilable`]) - the capability set every kind provides
//! 2. **Store Layer** ([`ResourceStore`], [`ResourceActor`], [`ResourceClient`]) - fetch and
//!    version-checked update of one named object
//! 3. **Protocol Primitives** ([`request_reconciliation`], [`poll_until`], [`handled`],
//!    [`readiness_state`]) - trigger, wait, evaluate
//! 4. **Orchestration** ([`Reconciler`]) - the end-to-end request-and-wait sequence
//!
//! ## Core Abstractions
//!
//! ### [`Reconcilable`] - The Capability Set
//!
//! A kind only has to expose its metadata, spec, status and suspend flag:
//!
//! ```rust
//! use reconcile_framework::{ObjectMeta, Reconcilable, ReconcileStatus};
//!
//! #[derive(Clone, Debug)]
//! struct Bucket {
//!     metadata: ObjectMeta,
//!     spec: BucketSpec,
//!     status: ReconcileStatus,
//! }
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct BucketSpec {
//!     bucket_name: String,
//!     suspend: bool,
//! }
//!
//! impl Reconcilable for Bucket {
//!     const KIND: &'static str = "Bucket";
//!     type Spec = BucketSpec;
//!
//!     fn meta(&self) -> &ObjectMeta { &self.metadata }
//!     fn meta_mut(&mut self) -> &mut ObjectMeta { &mut self.metadata }
//!     fn spec(&self) -> &BucketSpec { &self.spec }
//!     fn status(&self) -> &ReconcileStatus { &self.status }
//!     fn status_mut(&mut self) -> &mut ReconcileStatus { &mut self.status }
//!     fn suspended(&self) -> bool { self.spec.suspend }
//! }
//! ```
//!
//! ### [`Reconciler`] - The Protocol
//!
//! ```rust,ignore
//! let (actor, client) = ResourceActor::<Bucket>::new(32);
//! tokio::spawn(actor.run());
//!
//! let reconciler = Reconciler::new(client, ReconcileOptions::default());
//! match reconciler.reconcile(&ObjectKey::new("flux-system", "podinfo")).await {
//!     Ok(done) => println!("fetched revision {}", done.revision.unwrap_or_default()),
//!     Err(e) => eprintln!("✗ {e}"),
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - One reconciliation is strictly sequential: each step awaits its sub-operation
//! - The store processes requests one at a time, but concurrent *clients* race; a stale write
//!   is rejected with [`StoreError::Conflict`] and the trigger re-reads and retries
//! - A single deadline bounds the trigger retries and both waits
//!
//! ## Testing
//!
//! [`mock::MockStore`] answers store requests from a script, for exact request sequences and
//! error injection. See the [`mock`] module.

pub mod actor;
pub mod client;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod poll;
pub mod readiness;
pub mod reconcile;
pub mod status;
pub mod store;
pub mod tracing;
pub mod trigger;

#[cfg(test)]
mod fixtures;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use entity::{ObjectKey, ObjectMeta, Reconcilable, RECONCILE_REQUEST_ANNOTATION};
pub use error::{ReconcileError, StoreError, WaitPhase};
pub use message::{ResourceRequest, Response};
pub use poll::{poll_until, PollError};
pub use readiness::{handled, readiness_state, Readiness};
pub use reconcile::{ReconcileOptions, Reconciled, Reconciler};
pub use status::{Artifact, Condition, ConditionStatus, ReconcileStatus, READY_CONDITION};
pub use store::ResourceStore;
pub use trigger::{next_marker, request_reconciliation, Backoff};
