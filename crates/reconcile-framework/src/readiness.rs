//! # Readiness Evaluation
//!
//! Pure functions over a fetched snapshot. They decide whether the controller has picked up
//! a reconcile request yet, and whether the reconciliation it ran is finished.

use crate::entity::Reconcilable;
use crate::status::{ConditionStatus, READY_CONDITION};

/// Outcome of the controller's latest reconciliation, as seen in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Not finished, or the status describes an older generation.
    Pending,
    Ready,
    /// `Ready=False`, carrying the controller's message.
    Failed(String),
}

/// True once the controller has consumed a request made after `baseline` was captured.
///
/// `baseline` must be the `last_handled_reconcile_at` value read *before* the request was
/// written. Reading it afterwards could observe the controller's acknowledgement and make
/// this predicate wait for a second one that never comes.
pub fn handled<T: Reconcilable>(object: &T, baseline: &str) -> bool {
    object.status().last_handled_reconcile_at != baseline
}

pub fn readiness_state<T: Reconcilable>(object: &T) -> Readiness {
    // A Ready condition from a previous generation says nothing about the current spec.
    if object.status().observed_generation != object.meta().generation {
        return Readiness::Pending;
    }

    match object.status().find_condition(READY_CONDITION) {
        Some(c) if c.status == ConditionStatus::True => Readiness::Ready,
        Some(c) if c.status == ConditionStatus::False => Readiness::Failed(c.message.clone()),
        _ => Readiness::Pending,
    }
}
