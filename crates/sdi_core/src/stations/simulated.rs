//! Stations that perform no real work.
//!
//! The sample workflow only animates progress, so every working stage is
//! served by a [`SimulatedStation`] that logs and succeeds.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::context::RunContext;
use crate::error::CoreResult;
use crate::registry::StationRegistry;
use crate::stage::WorkflowStage;
use crate::station::{LogEntry, Station, StationResult};

/// Station that records its stage and always succeeds.
pub struct SimulatedStation {
    stage: WorkflowStage,
}

impl SimulatedStation {
    pub fn new(stage: WorkflowStage) -> Self {
        Self { stage }
    }
}

#[async_trait]
impl Station for SimulatedStation {
    fn stage(&self) -> WorkflowStage {
        self.stage
    }

    fn description(&self) -> &str {
        self.stage.description()
    }

    async fn execute(&self, context: &mut RunContext) -> CoreResult<StationResult> {
        debug!("Simulated station {} for run {}", self.stage, context.run_id);
        context.log(LogEntry::info(self.stage.description()).at(self.stage));
        Ok(StationResult::success(self.stage).with_message(self.stage.label()))
    }
}

/// Registry with a simulated station for each working stage.
pub fn default_registry() -> StationRegistry {
    let mut registry = StationRegistry::new();
    for stage in WorkflowStage::WORKING {
        registry.register(Arc::new(SimulatedStation::new(stage)));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_simulated_station_logs_stage() {
        let station = SimulatedStation::new(WorkflowStage::Analyze);
        let mut ctx = RunContext::new(Uuid::new_v4(), "input");

        let result = station.execute(&mut ctx).await.unwrap();

        assert!(result.success);
        assert_eq!(result.stage, WorkflowStage::Analyze);
        assert_eq!(ctx.logs.len(), 1);
        assert_eq!(ctx.logs[0].stage, Some(WorkflowStage::Analyze));
        assert_eq!(ctx.logs[0].message, "Understanding process flow");
    }
}
