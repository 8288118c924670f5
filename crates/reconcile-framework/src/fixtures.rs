//! Minimal resource kind shared by the unit tests.

use crate::entity::{ObjectMeta, Reconcilable};
use crate::status::{Artifact, Condition, ReconcileStatus};

#[derive(Clone, Debug, PartialEq)]
pub struct Widget {
    pub meta: ObjectMeta,
    pub spec: WidgetSpec,
    pub status: ReconcileStatus,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WidgetSpec {
    pub source: String,
    pub suspend: bool,
}

impl Widget {
    pub fn new(name: &str) -> Self {
        Self {
            meta: ObjectMeta::new("default", name),
            spec: WidgetSpec {
                source: "s3://widgets".to_string(),
                suspend: false,
            },
            status: ReconcileStatus::default(),
        }
    }

    pub fn with_generation(mut self, generation: i64, observed: i64) -> Self {
        self.meta.generation = generation;
        self.status.observed_generation = observed;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.status.set_condition(condition);
        self
    }

    pub fn with_artifact(mut self, revision: &str) -> Self {
        self.status.artifact = Some(Artifact {
            revision: revision.to_string(),
            url: String::new(),
        });
        self
    }
}

impl Reconcilable for Widget {
    const KIND: &'static str = "Widget";
    type Spec = WidgetSpec;

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }

    fn spec(&self) -> &WidgetSpec {
        &self.spec
    }

    fn status(&self) -> &ReconcileStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut ReconcileStatus {
        &mut self.status
    }

    fn suspended(&self) -> bool {
        self.spec.suspend
    }
}
