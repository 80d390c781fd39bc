//! Stage plans: the ordered `(stage, hold range)` pairs a run walks through.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::stage::WorkflowStage;

/// Default minimum hold per stage, in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 800;

/// Default random spread added on top of the base hold, in milliseconds.
pub const DEFAULT_JITTER_MS: u64 = 600;

/// How long a stage is held before the engine advances.
///
/// The hold is drawn uniformly from `[base, base + jitter)`. A zero jitter
/// means the hold is exactly `base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldRange {
    pub base_ms: u64,
    pub jitter_ms: u64,
}

impl Default for HoldRange {
    fn default() -> Self {
        Self {
            base_ms: DEFAULT_BASE_DELAY_MS,
            jitter_ms: DEFAULT_JITTER_MS,
        }
    }
}

impl HoldRange {
    pub fn new(base_ms: u64, jitter_ms: u64) -> Self {
        Self { base_ms, jitter_ms }
    }

    /// A hold with no random component.
    pub fn fixed(ms: u64) -> Self {
        Self::new(ms, 0)
    }

    /// Inclusive lower bound.
    pub fn min(&self) -> Duration {
        Duration::from_millis(self.base_ms)
    }

    /// Exclusive upper bound (equal to `min` for fixed holds).
    pub fn max(&self) -> Duration {
        Duration::from_millis(self.base_ms + self.jitter_ms)
    }

    /// Whether `hold` lies within this range.
    pub fn contains(&self, hold: Duration) -> bool {
        if self.jitter_ms == 0 {
            hold == self.min()
        } else {
            hold >= self.min() && hold < self.max()
        }
    }
}

/// One entry of a stage plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedStage {
    pub stage: WorkflowStage,
    pub hold: HoldRange,
}

/// Ordered list of working stages with their hold ranges.
///
/// Plans are always validated on construction: only working stages, each
/// exactly once, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePlan {
    stages: Vec<PlannedStage>,
}

impl Default for StagePlan {
    fn default() -> Self {
        Self::uniform(HoldRange::default())
    }
}

impl StagePlan {
    /// The five working stages, all sharing the same hold range.
    pub fn uniform(hold: HoldRange) -> Self {
        Self {
            stages: WorkflowStage::WORKING
                .iter()
                .map(|stage| PlannedStage { stage: *stage, hold })
                .collect(),
        }
    }

    pub fn builder() -> StagePlanBuilder {
        StagePlanBuilder::new()
    }

    pub fn stages(&self) -> &[PlannedStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Hold range for a given stage, if planned.
    pub fn hold_for(&self, stage: WorkflowStage) -> Option<HoldRange> {
        self.stages.iter().find(|p| p.stage == stage).map(|p| p.hold)
    }

    fn validate(stages: &[PlannedStage]) -> CoreResult<()> {
        if stages.len() != WorkflowStage::WORKING.len() {
            return Err(CoreError::InvalidPlan(format!(
                "expected {} stages, got {}",
                WorkflowStage::WORKING.len(),
                stages.len()
            )));
        }
        for (planned, expected) in stages.iter().zip(WorkflowStage::WORKING.iter()) {
            if planned.stage != *expected {
                return Err(CoreError::InvalidPlan(format!(
                    "stage {} out of order, expected {}",
                    planned.stage, expected
                )));
            }
        }
        Ok(())
    }
}

/// Builder for stage plans with per-stage hold overrides.
pub struct StagePlanBuilder {
    default_hold: HoldRange,
    overrides: Vec<(WorkflowStage, HoldRange)>,
}

impl Default for StagePlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StagePlanBuilder {
    pub fn new() -> Self {
        Self {
            default_hold: HoldRange::default(),
            overrides: Vec::new(),
        }
    }

    pub fn default_hold(mut self, hold: HoldRange) -> Self {
        self.default_hold = hold;
        self
    }

    pub fn hold(mut self, stage: WorkflowStage, hold: HoldRange) -> Self {
        self.overrides.push((stage, hold));
        self
    }

    pub fn build(self) -> CoreResult<StagePlan> {
        for (stage, _) in &self.overrides {
            if !stage.is_working() {
                return Err(CoreError::InvalidPlan(format!(
                    "{} is not a working stage",
                    stage
                )));
            }
        }

        let stages: Vec<PlannedStage> = WorkflowStage::WORKING
            .iter()
            .map(|stage| {
                let hold = self
                    .overrides
                    .iter()
                    .rev()
                    .find(|(s, _)| s == stage)
                    .map(|(_, h)| *h)
                    .unwrap_or(self.default_hold);
                PlannedStage { stage: *stage, hold }
            })
            .collect();

        StagePlan::validate(&stages)?;
        Ok(StagePlan { stages })
    }
}
