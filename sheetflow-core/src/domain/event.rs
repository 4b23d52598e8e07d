//! Pipeline lifecycle events
//!
//! Wire-level events streamed to connected browsers. The serde
//! attributes here are the WebSocket protocol, so event names and
//! payload fields must not drift.

use serde::{Deserialize, Serialize};

use crate::domain::step::StepId;

/// An event emitted during pipeline configuration or execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A step began executing
    StepStart { step_id: StepId },
    /// A step finished successfully
    StepComplete { step_id: StepId },
    /// A step failed; the run is aborted
    StepError { step_id: StepId, error: String },
    /// Every step succeeded and the output artifact is available
    PipelineComplete { output_file: String },
    /// The run failed outside any single step
    PipelineError { error: String },
    /// Response to a configuration update request
    PipelineConfigUpdated { success: bool },
}

impl PipelineEvent {
    pub fn step_error(step_id: StepId, error: impl Into<String>) -> Self {
        Self::StepError {
            step_id,
            error: error.into(),
        }
    }

    pub fn pipeline_error(error: impl Into<String>) -> Self {
        Self::PipelineError {
            error: error.into(),
        }
    }
}
