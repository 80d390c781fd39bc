//! Workflow stages and their display metadata.
//!
//! A run always walks the same ordered set of stages:
//!
//! ```text
//! idle -> parse -> analyze -> generate -> validate -> export -> complete
//! ```
//!
//! `Idle` is the only initial state and `Complete` the only terminal one.
//! The five stages in between are the *working* stages; each is held for a
//! sampled duration before the engine advances.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Stage of the generation workflow.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    #[default]
    Idle,
    Parse,
    Analyze,
    Generate,
    Validate,
    Export,
    Complete,
}

impl WorkflowStage {
    /// Every stage in canonical order, including idle and complete.
    pub const ALL: [WorkflowStage; 7] = [
        WorkflowStage::Idle,
        WorkflowStage::Parse,
        WorkflowStage::Analyze,
        WorkflowStage::Generate,
        WorkflowStage::Validate,
        WorkflowStage::Export,
        WorkflowStage::Complete,
    ];

    /// The working stages, in order.
    pub const WORKING: [WorkflowStage; 5] = [
        WorkflowStage::Parse,
        WorkflowStage::Analyze,
        WorkflowStage::Generate,
        WorkflowStage::Validate,
        WorkflowStage::Export,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Parse => "parse",
            Self::Analyze => "analyze",
            Self::Generate => "generate",
            Self::Validate => "validate",
            Self::Export => "export",
            Self::Complete => "complete",
        }
    }

    /// Short label shown in progress output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Parse => "Parse Input",
            Self::Analyze => "Analyze Context",
            Self::Generate => "Generate P&ID",
            Self::Validate => "Validate",
            Self::Export => "Export",
            Self::Complete => "Complete",
        }
    }

    /// One-line description of what the stage does.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Waiting for a process description",
            Self::Parse => "Extracting requirements from NL",
            Self::Analyze => "Understanding process flow",
            Self::Generate => "Building diagram structure",
            Self::Validate => "Checking completeness",
            Self::Export => "Preparing DEXPI output",
            Self::Complete => "Output ready",
        }
    }

    /// Whether this is one of the five working stages.
    pub fn is_working(&self) -> bool {
        !matches!(self, Self::Idle | Self::Complete)
    }

    /// Whether a new run may start from this stage.
    pub fn accepts_submission(&self) -> bool {
        !self.is_working()
    }

    /// The stage that follows this one, or `None` for `Complete`.
    ///
    /// Transitions only move forward; there is no way back except starting
    /// a fresh run, which resets to `Idle`.
    pub fn next(&self) -> Option<WorkflowStage> {
        let idx = self.index();
        Self::ALL.get(idx + 1).copied()
    }

    /// Position in the canonical order.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Position among the working stages, if this is one.
    pub fn working_index(&self) -> Option<usize> {
        Self::WORKING.iter().position(|s| s == self)
    }

    /// Status of the working stage `self` as seen while the workflow is at `current`.
    pub fn status_at(&self, current: WorkflowStage) -> StepStatus {
        match current {
            WorkflowStage::Idle => StepStatus::Pending,
            WorkflowStage::Complete => StepStatus::Complete,
            _ => {
                if self < &current {
                    StepStatus::Complete
                } else if self == &current {
                    StepStatus::Active
                } else {
                    StepStatus::Pending
                }
            }
        }
    }

    /// Fraction of the workflow done when the workflow is at this stage.
    pub fn progress(&self) -> f64 {
        match self {
            Self::Idle => 0.0,
            Self::Complete => 1.0,
            working => {
                let idx = working.working_index().unwrap_or(0) as f64;
                idx / (Self::WORKING.len() - 1) as f64
            }
        }
    }
}

impl std::fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-step status used by progress displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Active,
    Complete,
}

/// Status of every working stage relative to `current`.
pub fn step_statuses(current: WorkflowStage) -> Vec<(WorkflowStage, StepStatus)> {
    WorkflowStage::WORKING
        .iter()
        .map(|stage| (*stage, stage.status_at(current)))
        .collect()
}

impl FromStr for WorkflowStage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_is_forward_only() {
        let mut stage = WorkflowStage::Idle;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            visited.push(next);
            stage = next;
        }
        assert_eq!(visited, WorkflowStage::ALL.to_vec());
        assert_eq!(WorkflowStage::Complete.next(), None);
    }

    #[test]
    fn test_working_stages() {
        assert!(!WorkflowStage::Idle.is_working());
        assert!(!WorkflowStage::Complete.is_working());
        for stage in WorkflowStage::WORKING {
            assert!(stage.is_working());
            assert!(!stage.accepts_submission());
        }
    }

    #[test]
    fn test_step_status() {
        assert!(step_statuses(WorkflowStage::Idle)
            .iter()
            .all(|(_, s)| *s == StepStatus::Pending));
        assert!(step_statuses(WorkflowStage::Complete)
            .iter()
            .all(|(_, s)| *s == StepStatus::Complete));

        let statuses = step_statuses(WorkflowStage::Generate);
        assert_eq!(statuses[0].1, StepStatus::Complete);
        assert_eq!(statuses[1].1, StepStatus::Complete);
        assert_eq!(statuses[2].1, StepStatus::Active);
        assert_eq!(statuses[3].1, StepStatus::Pending);
        assert_eq!(statuses[4].1, StepStatus::Pending);
    }

    #[test]
    fn test_progress() {
        assert_eq!(WorkflowStage::Idle.progress(), 0.0);
        assert_eq!(WorkflowStage::Parse.progress(), 0.0);
        assert_eq!(WorkflowStage::Generate.progress(), 0.5);
        assert_eq!(WorkflowStage::Export.progress(), 1.0);
        assert_eq!(WorkflowStage::Complete.progress(), 1.0);
    }

    #[test]
    fn test_parse_stage_names() {
        for stage in WorkflowStage::ALL {
            assert_eq!(stage.as_str().parse::<WorkflowStage>().unwrap(), stage);
        }
        assert!(matches!(
            "bogus".parse::<WorkflowStage>(),
            Err(CoreError::UnknownStage(name)) if name == "bogus"
        ));
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(WorkflowStage::default(), WorkflowStage::Idle);
    }
}
