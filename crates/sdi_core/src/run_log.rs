//! Record of a single generation run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::output::GenerationOutput;
use crate::stage::WorkflowStage;
use crate::station::{LogEntry, StationResult};

/// Outcome state of a run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Running,
    Completed,
    Failed,
}

/// One stage entered during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTransition {
    pub stage: WorkflowStage,
    pub entered_at: DateTime<Utc>,
    /// How long the stage was held; `None` for idle and complete
    pub hold_ms: Option<u64>,
}

/// Ordered transitions and results of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    pub run_id: Uuid,
    pub input: String,
    pub state: RunState,
    pub transitions: Vec<StageTransition>,
    pub station_results: Vec<StationResult>,
    pub logs: Vec<LogEntry>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub output: Option<GenerationOutput>,
}

impl RunLog {
    /// A fresh log, positioned at `Idle`.
    pub fn new(run_id: Uuid, input: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            input: input.into(),
            state: RunState::Running,
            transitions: vec![StageTransition {
                stage: WorkflowStage::Idle,
                entered_at: now,
                hold_ms: None,
            }],
            station_results: Vec::new(),
            logs: Vec::new(),
            started_at: now,
            completed_at: None,
            error: None,
            output: None,
        }
    }

    pub(crate) fn enter(&mut self, stage: WorkflowStage) {
        self.transitions.push(StageTransition {
            stage,
            entered_at: Utc::now(),
            hold_ms: None,
        });
    }

    pub(crate) fn record_hold(&mut self, hold: Duration) {
        if let Some(last) = self.transitions.last_mut() {
            last.hold_ms = Some(hold.as_millis() as u64);
        }
    }

    pub(crate) fn complete(&mut self, output: GenerationOutput) {
        self.enter(WorkflowStage::Complete);
        self.state = RunState::Completed;
        self.output = Some(output);
        self.completed_at = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, error: &CoreError) {
        self.state = RunState::Failed;
        self.error = Some(error.to_string());
        self.completed_at = Some(Utc::now());
    }

    /// Stages in the order they were entered.
    pub fn stage_sequence(&self) -> Vec<WorkflowStage> {
        self.transitions.iter().map(|t| t.stage).collect()
    }

    /// Hold applied to each working stage.
    pub fn holds(&self) -> Vec<(WorkflowStage, Duration)> {
        self.transitions
            .iter()
            .filter_map(|t| t.hold_ms.map(|ms| (t.stage, Duration::from_millis(ms))))
            .collect()
    }

    /// Total simulated hold time.
    pub fn total_hold(&self) -> Duration {
        self.holds().iter().map(|(_, d)| *d).sum()
    }

    /// Stage the run failed at, if it failed.
    pub fn failed_stage(&self) -> Option<WorkflowStage> {
        if self.state == RunState::Failed {
            self.transitions.last().map(|t| t.stage)
        } else {
            None
        }
    }

    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_sequence_and_holds() {
        let mut log = RunLog::new(Uuid::new_v4(), "input");
        log.enter(WorkflowStage::Parse);
        log.record_hold(Duration::from_millis(900));
        log.enter(WorkflowStage::Analyze);
        log.record_hold(Duration::from_millis(1000));
        log.complete(GenerationOutput::sample());

        assert_eq!(
            log.stage_sequence(),
            vec![
                WorkflowStage::Idle,
                WorkflowStage::Parse,
                WorkflowStage::Analyze,
                WorkflowStage::Complete
            ]
        );
        assert_eq!(log.holds().len(), 2);
        assert_eq!(log.total_hold(), Duration::from_millis(1900));
        assert_eq!(log.state, RunState::Completed);
        assert!(log.failed_stage().is_none());
    }

    #[test]
    fn test_failed_stage() {
        let mut log = RunLog::new(Uuid::new_v4(), "input");
        log.enter(WorkflowStage::Parse);
        log.fail(&CoreError::generation(WorkflowStage::Parse, "unreadable"));

        assert_eq!(log.failed_stage(), Some(WorkflowStage::Parse));
        assert!(log.error.as_deref().unwrap().contains("unreadable"));
    }

    #[test]
    fn test_log_serializes() {
        let log = RunLog::new(Uuid::new_v4(), "input");
        assert_eq!(log.state, RunState::default());
        let json = log.to_json().unwrap();
        assert!(json.contains("\"state\": \"running\""));
    }
}
