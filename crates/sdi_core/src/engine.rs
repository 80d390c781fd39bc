//! Generation workflow engine.
//!
//! The engine walks a [`StagePlan`] one stage at a time. Entering a stage
//! publishes it to subscribers and runs the stage's station; the engine then
//! holds for a sampled duration before advancing. After the last hold it
//! asks the [`GenerationStrategy`] for the output, moves to `Complete` and
//! publishes the output in the same step.
//!
//! Only one run may be active per engine. The slot is taken by
//! [`WorkflowEngine::begin`] and released when the run completes, fails, or
//! its [`RunTicket`] is dropped.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::WorkflowConfig;
use crate::context::RunContext;
use crate::error::{CoreError, CoreResult};
use crate::output::{GenerationOutput, GenerationStrategy, SampleStrategy};
use crate::registry::StationRegistry;
use crate::run_log::RunLog;
use crate::scheduler::{DelaySampler, Scheduler, TokioScheduler};
use crate::stage::WorkflowStage;
use crate::station::LogEntry;
use crate::stations::default_registry;
use crate::workflow::StagePlan;

#[derive(Debug, Default)]
struct EngineState {
    stage: WorkflowStage,
    output: Option<GenerationOutput>,
    active_run: Option<Uuid>,
    last_run: Option<RunLog>,
}

/// State shared between the engine and outstanding tickets.
#[derive(Debug)]
struct Shared {
    state: RwLock<EngineState>,
    stage_tx: watch::Sender<WorkflowStage>,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, EngineState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, EngineState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, stage: WorkflowStage) {
        self.stage_tx.send_replace(stage);
    }

    /// Return to a re-submittable state after a run stops early.
    fn release(&self, run_id: Uuid, log: Option<RunLog>) {
        let mut state = self.write();
        if state.active_run != Some(run_id) {
            return;
        }
        state.stage = WorkflowStage::Idle;
        state.output = None;
        state.active_run = None;
        if log.is_some() {
            state.last_run = log;
        }
        drop(state);
        self.publish(WorkflowStage::Idle);
    }
}

/// Claim on the engine's single run slot.
///
/// Pass it to [`WorkflowEngine::run`]. Dropping it without running, or
/// dropping the `run` future part way, frees the slot and resets the engine
/// to `Idle`.
#[must_use = "a ticket holds the engine's run slot until it is run or dropped"]
pub struct RunTicket {
    run_id: Uuid,
    input: String,
    shared: Arc<Shared>,
    finished: bool,
}

impl RunTicket {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

impl std::fmt::Debug for RunTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunTicket")
            .field("run_id", &self.run_id)
            .field("finished", &self.finished)
            .finish()
    }
}

impl Drop for RunTicket {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Run {} abandoned before completion", self.run_id);
            self.shared.release(self.run_id, None);
        }
    }
}

/// Single-flight generation workflow engine.
pub struct WorkflowEngine {
    plan: StagePlan,
    registry: Arc<StationRegistry>,
    strategy: Arc<dyn GenerationStrategy>,
    scheduler: Arc<dyn Scheduler>,
    sampler: DelaySampler,
    shared: Arc<Shared>,
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowEngine {
    /// Engine with the default plan, simulated stations, sample strategy
    /// and tokio timers.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> WorkflowEngineBuilder {
        WorkflowEngineBuilder::default()
    }

    /// Engine configured from a `[workflow]` config section.
    pub fn from_config(config: &WorkflowConfig) -> CoreResult<Self> {
        Ok(WorkflowEngineBuilder::from_config(config)?.build())
    }

    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Current stage.
    pub fn stage(&self) -> WorkflowStage {
        self.shared.read().stage
    }

    /// Output of the last completed run, cleared when a new run begins.
    pub fn output(&self) -> Option<GenerationOutput> {
        self.shared.read().output.clone()
    }

    /// Log of the most recent finished (completed or failed) run.
    pub fn last_run(&self) -> Option<RunLog> {
        self.shared.read().last_run.clone()
    }

    pub fn is_running(&self) -> bool {
        self.shared.read().active_run.is_some()
    }

    /// Receive every stage change as it happens.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowStage> {
        self.shared.stage_tx.subscribe()
    }

    /// Claim the run slot for `input`.
    ///
    /// Fails with [`CoreError::RunInProgress`] while another run is active.
    /// On success the stage is reset to `Idle` and any previous output is
    /// cleared.
    pub fn begin(&self, input: impl Into<String>) -> CoreResult<RunTicket> {
        let input = input.into();
        let mut state = self.shared.write();
        if state.active_run.is_some() {
            warn!("Rejected submission: run already in progress at {}", state.stage);
            return Err(CoreError::RunInProgress(state.stage));
        }

        let run_id = Uuid::new_v4();
        state.active_run = Some(run_id);
        state.stage = WorkflowStage::Idle;
        state.output = None;
        drop(state);
        self.shared.publish(WorkflowStage::Idle);

        info!("Starting generation run {}", run_id);
        Ok(RunTicket {
            run_id,
            input,
            shared: Arc::clone(&self.shared),
            finished: false,
        })
    }

    /// Drive a claimed run through every planned stage to completion.
    pub async fn run(&self, mut ticket: RunTicket) -> CoreResult<RunLog> {
        if !Arc::ptr_eq(&ticket.shared, &self.shared) {
            return Err(CoreError::UnknownRun(ticket.run_id.to_string()));
        }

        let mut log = RunLog::new(ticket.run_id, ticket.input.clone());
        let mut context = RunContext::new(ticket.run_id, ticket.input.clone());

        match self.walk(&mut log, &mut context).await {
            Ok(output) => {
                log.logs = context.logs;
                log.complete(output.clone());
                {
                    let mut state = self.shared.write();
                    state.stage = WorkflowStage::Complete;
                    state.output = Some(output);
                    state.active_run = None;
                    state.last_run = Some(log.clone());
                }
                self.shared.publish(WorkflowStage::Complete);
                ticket.finished = true;

                info!(
                    "Generation run {} completed in {:?} of holds",
                    log.run_id,
                    log.total_hold()
                );
                Ok(log)
            }
            Err(e) => {
                error!("Generation run {} failed: {}", ticket.run_id, e);
                log.logs = context.logs;
                log.fail(&e);
                ticket.finished = true;
                self.shared.release(ticket.run_id, Some(log));
                Err(e)
            }
        }
    }

    /// Claim the slot and run to completion.
    pub async fn execute(&self, input: impl Into<String>) -> CoreResult<RunLog> {
        let ticket = self.begin(input)?;
        self.run(ticket).await
    }

    async fn walk(
        &self,
        log: &mut RunLog,
        context: &mut RunContext,
    ) -> CoreResult<GenerationOutput> {
        let total = self.plan.len();

        for (i, planned) in self.plan.stages().iter().enumerate() {
            let stage = planned.stage;
            self.enter(stage);
            log.enter(stage);
            debug!("Stage [{}/{}]: {} ({})", i + 1, total, stage.label(), stage.description());

            let station = self
                .registry
                .get_required(stage)
                .map_err(|e| CoreError::generation(stage, e.to_string()))?;

            let result = match station.execute(context).await {
                Ok(result) => result,
                Err(e @ CoreError::Generation { .. }) => return Err(e),
                Err(e) => return Err(CoreError::generation(stage, e.to_string())),
            };
            let success = result.success;
            let message = result.message.clone();
            log.station_results.push(result);
            if !success {
                let message = message.unwrap_or_else(|| "station failed".to_string());
                context.log(LogEntry::error(message.clone()).at(stage));
                return Err(CoreError::generation(stage, message));
            }

            let hold = self.sampler.sample(planned.hold);
            self.scheduler.hold(hold).await;
            log.record_hold(hold);
        }

        match self.strategy.generate(&context.input).await {
            Ok(output) => Ok(output),
            Err(e @ CoreError::Generation { .. }) => Err(e),
            Err(e) => Err(CoreError::generation(WorkflowStage::Export, e.to_string())),
        }
    }

    fn enter(&self, stage: WorkflowStage) {
        self.shared.write().stage = stage;
        self.shared.publish(stage);
    }
}

/// Builder for [`WorkflowEngine`].
#[derive(Default)]
pub struct WorkflowEngineBuilder {
    plan: Option<StagePlan>,
    registry: Option<StationRegistry>,
    strategy: Option<Arc<dyn GenerationStrategy>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    seed: Option<u64>,
}

impl WorkflowEngineBuilder {
    /// Builder seeded with the plan and seed of a `[workflow]` section.
    pub fn from_config(config: &WorkflowConfig) -> CoreResult<Self> {
        let mut builder = Self::default().plan(config.plan()?);
        if let Some(seed) = config.seed {
            builder = builder.seed(seed);
        }
        Ok(builder)
    }

    pub fn plan(mut self, plan: StagePlan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn registry(mut self, registry: StationRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn strategy(mut self, strategy: Arc<dyn GenerationStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Fix the hold sampler's seed for reproducible timing.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> WorkflowEngine {
        let (stage_tx, _) = watch::channel(WorkflowStage::Idle);
        WorkflowEngine {
            plan: self.plan.unwrap_or_default(),
            registry: Arc::new(self.registry.unwrap_or_else(default_registry)),
            strategy: self.strategy.unwrap_or_else(|| Arc::new(SampleStrategy)),
            scheduler: self.scheduler.unwrap_or_else(|| Arc::new(TokioScheduler)),
            sampler: self
                .seed
                .map(DelaySampler::seeded)
                .unwrap_or_else(DelaySampler::from_entropy),
            shared: Arc::new(Shared {
                state: RwLock::new(EngineState::default()),
                stage_tx,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::scheduler::ImmediateScheduler;
    use crate::station::{Station, StationResult};
    use crate::stations::SimulatedStation;
    use crate::workflow::HoldRange;
    use async_trait::async_trait;
    use std::time::Duration;

    fn fast_engine() -> WorkflowEngine {
        WorkflowEngine::builder()
            .scheduler(Arc::new(ImmediateScheduler))
            .seed(3)
            .build()
    }

    struct FailingStation {
        stage: WorkflowStage,
    }

    #[async_trait]
    impl Station for FailingStation {
        fn stage(&self) -> WorkflowStage {
            self.stage
        }

        fn description(&self) -> &str {
            "A station that always fails"
        }

        async fn execute(&self, _context: &mut RunContext) -> CoreResult<StationResult> {
            Ok(StationResult::failure(self.stage, "Intentional failure"))
        }
    }

    fn registry_failing_at(stage: WorkflowStage) -> StationRegistry {
        let mut registry = StationRegistry::new();
        for s in WorkflowStage::WORKING {
            if s == stage {
                registry.register(Arc::new(FailingStation { stage: s }));
            } else {
                registry.register(Arc::new(SimulatedStation::new(s)));
            }
        }
        registry
    }

    #[tokio::test]
    async fn test_run_visits_every_stage_in_order() {
        let engine = fast_engine();
        let log = engine.execute("a pump feeding a heat exchanger").await.unwrap();

        assert_eq!(log.stage_sequence(), WorkflowStage::ALL.to_vec());
        assert_eq!(engine.stage(), WorkflowStage::Complete);
        assert_eq!(engine.output(), Some(GenerationOutput::sample()));
        assert!(!engine.is_running());
    }

    #[tokio::test]
    async fn test_holds_within_bounds() {
        let engine = fast_engine();
        let log = engine.execute("anything").await.unwrap();

        let holds = log.holds();
        assert_eq!(holds.len(), 5);
        for (_, hold) in holds {
            assert!(hold >= Duration::from_millis(800));
            assert!(hold < Duration::from_millis(1400));
        }
    }

    #[tokio::test]
    async fn test_begin_rejects_while_running() {
        let engine = fast_engine();
        let ticket = engine.begin("first").unwrap();

        let second = engine.begin("second");
        assert!(matches!(second, Err(CoreError::RunInProgress(_))));

        engine.run(ticket).await.unwrap();
        assert!(engine.begin("third").is_ok());
    }

    #[tokio::test]
    async fn test_new_run_clears_previous_output() {
        let engine = fast_engine();
        engine.execute("first").await.unwrap();
        assert!(engine.output().is_some());

        let ticket = engine.begin("second").unwrap();
        assert!(engine.output().is_none());
        assert_eq!(engine.stage(), WorkflowStage::Idle);
        drop(ticket);
    }

    #[tokio::test]
    async fn test_dropped_ticket_releases_slot() {
        let engine = fast_engine();
        let ticket = engine.begin("first").unwrap();
        assert!(engine.is_running());
        drop(ticket);
        assert!(!engine.is_running());
        assert!(engine.begin("again").is_ok());
    }

    #[tokio::test]
    async fn test_station_failure_is_recoverable() {
        let engine = WorkflowEngine::builder()
            .scheduler(Arc::new(ImmediateScheduler))
            .registry(registry_failing_at(WorkflowStage::Validate))
            .build();

        let err = engine.execute("tank").await.unwrap_err();
        match err {
            CoreError::Generation { stage, kind, .. } => {
                assert_eq!(stage, WorkflowStage::Validate);
                assert_eq!(kind, FailureKind::ValidationFailure);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(engine.stage(), WorkflowStage::Idle);
        assert!(engine.output().is_none());
        assert!(!engine.is_running());
        let last = engine.last_run().unwrap();
        assert_eq!(last.failed_stage(), Some(WorkflowStage::Validate));
    }

    #[tokio::test]
    async fn test_missing_station_fails_at_stage() {
        let mut registry = registry_failing_at(WorkflowStage::Parse);
        registry.unregister(WorkflowStage::Parse);
        let engine = WorkflowEngine::builder()
            .scheduler(Arc::new(ImmediateScheduler))
            .registry(registry)
            .build();

        let err = engine.execute("x").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Generation {
                kind: FailureKind::ParseFailure,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_ticket_from_other_engine_rejected() {
        let a = fast_engine();
        let b = fast_engine();
        let ticket = a.begin("x").unwrap();
        assert!(matches!(b.run(ticket).await, Err(CoreError::UnknownRun(_))));
        assert!(!a.is_running());
    }

    #[tokio::test]
    async fn test_from_config_uses_configured_holds() {
        let config = WorkflowConfig {
            base_delay_ms: 5,
            jitter_ms: 0,
            seed: Some(1),
        };
        let engine = WorkflowEngineBuilder::from_config(&config)
            .unwrap()
            .scheduler(Arc::new(ImmediateScheduler))
            .build();

        let log = engine.execute("x").await.unwrap();
        assert!(log
            .holds()
            .iter()
            .all(|(_, hold)| *hold == Duration::from_millis(5)));

        let engine = WorkflowEngine::from_config(&config).unwrap();
        assert!(engine
            .plan()
            .stages()
            .iter()
            .all(|planned| planned.hold == HoldRange::fixed(5)));
    }

    #[tokio::test]
    async fn test_subscriber_sees_final_stage() {
        let engine = fast_engine();
        let rx = engine.subscribe();
        engine.execute("x").await.unwrap();
        assert_eq!(*rx.borrow(), WorkflowStage::Complete);
    }
}
