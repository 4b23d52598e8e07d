//! Error types for the transfer pipeline

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::step::StepId;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while configuring or running the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A run was requested before both spreadsheets were uploaded
    #[error("please upload both spreadsheet files before running the pipeline")]
    MissingInput,

    /// A reorder request referenced a step id that does not exist
    #[error("unknown pipeline step id: '{0}'")]
    InvalidStepId(String),

    /// A reorder request omitted a known step
    #[error("step order must list every pipeline step; missing '{0}'")]
    IncompleteStepOrder(StepId),

    /// A reorder request listed a step more than once
    #[error("step order lists '{0}' more than once")]
    DuplicateStepId(StepId),

    /// A workbook could not be opened or parsed
    #[error("failed to read workbook {}: {message}", .path.display())]
    WorkbookRead { path: PathBuf, message: String },

    /// A workbook could not be written or saved
    #[error("failed to write workbook {}: {message}", .path.display())]
    WorkbookWrite { path: PathBuf, message: String },

    /// The previous destination file could not be copied to the backup
    /// location
    #[error("failed to back up {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination file was missing or uncopyable at finalize time
    #[error("failed to generate output file: {0}")]
    OutputCopy(String),
}

impl PipelineError {
    /// Create a read error for the workbook at `path`
    pub fn workbook_read(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::WorkbookRead {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a write error for the workbook at `path`
    pub fn workbook_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::WorkbookWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error rejects a step ordering request
    pub fn is_order_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidStepId(_) | Self::IncompleteStepOrder(_) | Self::DuplicateStepId(_)
        )
    }
}
