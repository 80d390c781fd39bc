//! # sdi_core
//!
//! Generation workflow engine for Smart Drawing Intelligence.
//!
//! This crate provides the stage state machine, stage plans, stations and
//! the single-flight engine that turns a process description into a P&ID
//! generation output.
//!
//! # Architecture
//!
//! - **Stages**: `idle -> parse -> analyze -> generate -> validate -> export -> complete`
//! - **Stage plan**: ordered working stages with their hold ranges
//! - **Stations**: per-stage hooks, looked up in a registry
//! - **Scheduler**: timed suspension between stages
//! - **Strategy**: produces the output once every stage has run
//!
//! # Example
//!
//! ```rust,ignore
//! use sdi_core::{WorkflowEngine, WorkflowStage};
//!
//! let engine = WorkflowEngine::new();
//! let log = engine.execute("A heat exchanger feeding a pump").await?;
//!
//! assert_eq!(engine.stage(), WorkflowStage::Complete);
//! println!("{}", engine.output().unwrap().diagram_text);
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod graph;
pub mod output;
pub mod registry;
pub mod render;
pub mod run_log;
pub mod scheduler;
pub mod stage;
pub mod station;
pub mod stations;
pub mod workflow;

// Re-export main types for convenience
pub use config::{AuthConfig, SdiConfig, WorkflowConfig};
pub use context::RunContext;
pub use engine::{RunTicket, WorkflowEngine, WorkflowEngineBuilder};
pub use error::{CoreError, CoreResult, FailureKind};
pub use graph::{GraphEdge, GraphLayout, GraphNode};
pub use output::{
    Equipment, EquipmentCategory, GenerationOutput, GenerationStrategy, SampleStrategy,
    SAMPLE_DIAGRAM_TEXT,
};
pub use registry::StationRegistry;
pub use run_log::{RunLog, RunState, StageTransition};
pub use scheduler::{DelaySampler, ImmediateScheduler, Scheduler, TokioScheduler};
pub use stage::{step_statuses, StepStatus, WorkflowStage};
pub use station::{LogEntry, LogLevel, Station, StationResult};
pub use stations::{default_registry, SimulatedStation};
pub use workflow::{HoldRange, PlannedStage, StagePlan, StagePlanBuilder};
