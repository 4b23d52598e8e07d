//! Pipeline step identities

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Identity of a pipeline step
///
/// The set of steps is fixed for the life of the process; only their
/// order is configurable. Serialized forms are the wire ids the browser
/// sends and receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    DifferentSheetTransfer,
    ExcelMacro,
    SameSheetTransfer,
}

impl StepId {
    /// Wire id of this step
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::DifferentSheetTransfer => "different_sheet_transfer",
            StepId::ExcelMacro => "excel_macro",
            StepId::SameSheetTransfer => "same_sheet_transfer",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "different_sheet_transfer" => Ok(StepId::DifferentSheetTransfer),
            "excel_macro" => Ok(StepId::ExcelMacro),
            "same_sheet_transfer" => Ok(StepId::SameSheetTransfer),
            other => Err(PipelineError::InvalidStepId(other.to_string())),
        }
    }
}

/// A named, ordered unit of work in the pipeline
///
/// Bound permanently to one operation via its id; `name` is the label
/// shown in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub id: StepId,
    pub name: &'static str,
}

impl Step {
    /// The built-in steps in their default execution order
    pub fn default_order() -> Vec<Step> {
        vec![
            Step {
                id: StepId::DifferentSheetTransfer,
                name: "Transfer to New Sheet",
            },
            Step {
                id: StepId::ExcelMacro,
                name: "Execute Excel Macro",
            },
            Step {
                id: StepId::SameSheetTransfer,
                name: "Append to Base Sheet",
            },
        ]
    }
}
