//! # Observability & Tracing
//!
//! This module provides the tracing setup shared by every binary built on the framework.
//!
//! ## What Gets Traced
//!
//! - **Store lifecycle**: startup, shutdown, and object count
//! - **Store operations**: Create, Get, List, Update, UpdateStatus, and write conflicts
//! - **Reconciliation steps**: annotate, wait, completion or failure, inside a
//!   `reconcile{kind=… key=…}` span
//!
//! ## Usage Examples
//!
//! ```bash
//! # Step-by-step progress (default)
//! RUST_LOG=info flux-reconcile --manifest sources.yaml source bucket podinfo
//!
//! # Every store round-trip, including each poll
//! RUST_LOG=debug flux-reconcile --manifest sources.yaml source bucket podinfo
//!
//! # Only the framework internals
//! RUST_LOG=reconcile_framework=trace flux-reconcile ...
//! ```
//!
//! ## Output Format
//!
//! The compact format shows spans inline, so each line carries its kind and key:
//!
//! ```text
//! INFO reconcile{kind="Bucket" key=flux-system/podinfo}: Annotating Bucket namespace=flux-system
//! INFO reconcile{kind="Bucket" key=flux-system/podinfo}: Bucket annotated marker=2024-...Z
//! INFO reconcile{kind="Bucket" key=flux-system/podinfo}: Waiting for Bucket reconciliation
//! INFO reconcile{kind="Bucket" key=flux-system/podinfo}: Bucket reconciliation completed revision=…
//! ```

/// Initializes the global subscriber, filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // kind and key fields identify the source
        .compact()
        .init();
}
