//! Station registry for managing station implementations.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::stage::WorkflowStage;
use crate::station::Station;

/// Maps working stages to the station that runs when the stage is entered.
#[derive(Default)]
pub struct StationRegistry {
    stations: HashMap<WorkflowStage, Arc<dyn Station>>,
}

impl StationRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            stations: HashMap::new(),
        }
    }

    /// Register a station under its own `stage()`.
    ///
    /// If a station for that stage already exists, it is replaced.
    pub fn register(&mut self, station: Arc<dyn Station>) {
        let stage = station.stage();
        debug!("Registering station for stage: {}", stage);
        self.stations.insert(stage, station);
    }

    pub fn get(&self, stage: WorkflowStage) -> Option<Arc<dyn Station>> {
        self.stations.get(&stage).cloned()
    }

    /// Get a station, returning an error if none is registered.
    pub fn get_required(&self, stage: WorkflowStage) -> CoreResult<Arc<dyn Station>> {
        self.get(stage).ok_or(CoreError::StationNotFound(stage))
    }

    pub fn contains(&self, stage: WorkflowStage) -> bool {
        self.stations.contains_key(&stage)
    }

    /// Registered stages in canonical order.
    pub fn stages(&self) -> Vec<WorkflowStage> {
        let mut stages: Vec<_> = self.stations.keys().copied().collect();
        stages.sort();
        stages
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn unregister(&mut self, stage: WorkflowStage) -> Option<Arc<dyn Station>> {
        debug!("Unregistering station for stage: {}", stage);
        self.stations.remove(&stage)
    }
}

impl std::fmt::Debug for StationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StationRegistry")
            .field("stages", &self.stages())
            .finish()
    }
}
