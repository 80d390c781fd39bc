//! Station definitions.
//!
//! A station is the hook run when the engine enters a working stage. The
//! engine owns sequencing and holds; stations only do the stage's work and
//! report success or failure. A failing station is where a real generation
//! backend would surface parse, validation, or export errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use sdi_core::{Station, StationResult, RunContext, WorkflowStage, CoreResult};
//!
//! struct TokenizeStation;
//!
//! #[async_trait]
//! impl Station for TokenizeStation {
//!     fn stage(&self) -> WorkflowStage { WorkflowStage::Parse }
//!     fn description(&self) -> &str { "Splits the description into tokens" }
//!
//!     async fn execute(&self, context: &mut RunContext) -> CoreResult<StationResult> {
//!         let count = context.input.split_whitespace().count();
//!         context.set("token_count", count.into());
//!         Ok(StationResult::success(self.stage()))
//!     }
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::RunContext;
use crate::error::CoreResult;
use crate::stage::WorkflowStage;

/// Result from station execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationResult {
    pub stage: WorkflowStage,
    pub success: bool,
    pub message: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl StationResult {
    pub fn success(stage: WorkflowStage) -> Self {
        Self {
            stage,
            success: true,
            message: None,
            completed_at: Utc::now(),
        }
    }

    pub fn failure(stage: WorkflowStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            success: false,
            message: Some(message.into()),
            completed_at: Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A log entry from station execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub stage: Option<WorkflowStage>,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level: LogLevel::Info,
            message: message.into(),
            stage: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level: LogLevel::Error,
            message: message.into(),
            stage: None,
        }
    }

    pub fn at(mut self, stage: WorkflowStage) -> Self {
        self.stage = Some(stage);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Trait for station implementations.
///
/// Stations must be `Send + Sync` so an engine can be shared across tasks.
#[async_trait]
pub trait Station: Send + Sync {
    /// The working stage this station serves.
    fn stage(&self) -> WorkflowStage;

    /// Human-readable description of the station.
    fn description(&self) -> &str;

    /// Do the stage's work.
    ///
    /// Returning `Ok` with a failed result and returning `Err` are both
    /// treated as a generation failure at this stage.
    async fn execute(&self, context: &mut RunContext) -> CoreResult<StationResult>;
}
