//! # flux-reconcile
//!
//! Requests an out-of-band reconciliation of a Flux source and waits for the
//! controller to finish it, on top of [`reconcile_framework`].
//!
//! ## Core Components
//!
//! - **[model]**: Source kinds ([`Bucket`](model::Bucket), [`GitRepository`](model::GitRepository))
//!   implementing [`Reconcilable`](reconcile_framework::Reconcilable), and the manifest loader.
//! - **[clients]**: Traced store clients, one per kind.
//! - **[controller]**: A simulated source controller that answers reconcile requests.
//! - **[lifecycle]**: [`SourceSystem`](lifecycle::SourceSystem) starts and stops the stores and
//!   controllers.
//! - **[config]**, **[cli]**, **[command]**: the `flux-reconcile` command.

pub mod cli;
pub mod clients;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod lifecycle;
pub mod model;
