//! # Reconciliation Status
//!
//! Status types written by the controller and read by the waiting client.

use serde::{Deserialize, Serialize};

/// Condition type reporting overall readiness.
pub const READY_CONDITION: &str = "Ready";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

/// A named status report. A status carries at most one condition per `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

impl Condition {
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            message: message.into(),
        }
    }

    pub fn ready(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(READY_CONDITION, ConditionStatus::True, reason, message)
    }

    pub fn not_ready(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(READY_CONDITION, ConditionStatus::False, reason, message)
    }
}

/// Result metadata produced by a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub revision: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileStatus {
    #[serde(default)]
    pub observed_generation: i64,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub last_handled_reconcile_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
}

impl ReconcileStatus {
    pub fn find_condition(&self, type_: &str) -> Option<&Condition> {
        find_condition(&self.conditions, type_)
    }

    pub fn set_condition(&mut self, condition: Condition) {
        set_condition(&mut self.conditions, condition)
    }
}

pub fn find_condition<'a>(conditions: &'a [Condition], type_: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.type_ == type_)
}

/// Inserts `condition`, replacing any existing entry of the same type in place.
pub fn set_condition(conditions: &mut Vec<Condition>, condition: Condition) {
    match conditions.iter_mut().find(|c| c.type_ == condition.type_) {
        Some(existing) => *existing = condition,
        None => conditions.push(condition),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_condition_replaces_same_type() {
        let mut status = ReconcileStatus::default();
        status.set_condition(Condition::not_ready("Progressing", "working"));
        status.set_condition(Condition::new(
            "Reconciling",
            ConditionStatus::True,
            "Progressing",
            "",
        ));
        status.set_condition(Condition::ready("Succeeded", "stored artifact"));

        assert_eq!(status.conditions.len(), 2);
        assert_eq!(status.conditions[0].type_, READY_CONDITION);
        let ready = status.find_condition(READY_CONDITION).unwrap();
        assert_eq!(ready.status, ConditionStatus::True);
        assert_eq!(ready.message, "stored artifact");
    }

    #[test]
    fn test_find_condition_missing() {
        let status = ReconcileStatus::default();
        assert!(status.find_condition(READY_CONDITION).is_none());
    }
}
