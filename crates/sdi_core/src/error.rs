//! Error types for the core module.

use thiserror::Error;

use crate::stage::WorkflowStage;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Kind of generation failure, keyed by the stage that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ParseFailure,
    ValidationFailure,
    ExportFailure,
    StageFailure,
}

impl FailureKind {
    /// Map a stage to the failure kind reported when it fails.
    pub fn for_stage(stage: WorkflowStage) -> Self {
        match stage {
            WorkflowStage::Parse => Self::ParseFailure,
            WorkflowStage::Validate => Self::ValidationFailure,
            WorkflowStage::Export => Self::ExportFailure,
            _ => Self::StageFailure,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ParseFailure => "parse failure",
            Self::ValidationFailure => "validation failure",
            Self::ExportFailure => "export failure",
            Self::StageFailure => "stage failure",
        };
        f.write_str(s)
    }
}

/// Errors that can occur during core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("A generation run is already in progress (stage: {0})")]
    RunInProgress(WorkflowStage),

    #[error("Invalid stage plan: {0}")]
    InvalidPlan(String),

    #[error("No station registered for stage: {0}")]
    StationNotFound(WorkflowStage),

    #[error("Unknown run ticket: {0}")]
    UnknownRun(String),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Generation {kind} at {stage}: {message}")]
    Generation {
        stage: WorkflowStage,
        kind: FailureKind,
        message: String,
    },

    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// Build a generation failure for the given stage.
    pub fn generation(stage: WorkflowStage, message: impl Into<String>) -> Self {
        Self::Generation {
            stage,
            kind: FailureKind::for_stage(stage),
            message: message.into(),
        }
    }
}
