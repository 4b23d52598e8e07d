//! Pipeline step registry
//!
//! Owns the live step order. Reordering validates the requested ids
//! first and then swaps in a freshly computed order, so a failed
//! request never leaves the sequence half-sorted.

use std::sync::Mutex;

use tracing::debug;

use crate::domain::step::{Step, StepId};
use crate::error::{PipelineError, Result};

/// Ordered registry of the pipeline's steps
pub struct PipelineRegistry {
    steps: Mutex<Vec<Step>>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self {
            steps: Mutex::new(Step::default_order()),
        }
    }

    /// Current order, cloned
    ///
    /// A run iterates the snapshot it took at start, so reorders that
    /// arrive later cannot affect an in-flight run.
    pub fn snapshot(&self) -> Vec<Step> {
        self.steps.lock().unwrap().clone()
    }

    /// Reassigns the step order to match `requested`
    ///
    /// Every known step must appear exactly once. Unknown, duplicate,
    /// and missing ids all reject the request without touching the
    /// current order.
    pub fn reorder(&self, requested: &[String]) -> Result<()> {
        let order = Self::parse_order(requested)?;

        let mut steps = self.steps.lock().unwrap();
        let mut next = steps.clone();
        next.sort_by_key(|step| order.iter().position(|id| *id == step.id));
        *steps = next;

        debug!(?requested, "pipeline step order updated");
        Ok(())
    }

    fn parse_order(requested: &[String]) -> Result<Vec<StepId>> {
        let mut order = Vec::with_capacity(requested.len());
        for raw in requested {
            let id: StepId = raw.parse()?;
            if order.contains(&id) {
                return Err(PipelineError::DuplicateStepId(id));
            }
            order.push(id);
        }

        for step in Step::default_order() {
            if !order.contains(&step.id) {
                return Err(PipelineError::IncompleteStepOrder(step.id));
            }
        }

        Ok(order)
    }
}

impl Default for PipelineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
