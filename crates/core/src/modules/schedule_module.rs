use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

use super::traits::{AsyncModule, ModuleEvent, ModuleId, ModuleMessage};
use crate::output::OutputBuffers;
use crate::patch::PatchBuilder;
use crate::schedule::overrides::OverrideLayer;
use crate::schedule::resolver::ScheduleResolver;
use crate::sense::SenseStore;
use crate::state::ControllerState;
use crate::status::{StatusIndicator, STATUS_OFFLINE, STATUS_OK};

/// Default coarse re-evaluation period.
pub const DEFAULT_SCHEDULE_INTERVAL_MS: u64 = 1000;
const MIN_SCHEDULE_INTERVAL_MS: u64 = 100;
const MAX_SCHEDULE_INTERVAL_MS: u64 = 5000;

/// The coarse loop: resolves schedule + overrides into an assignment,
/// rebuilds the patch, and swaps it into the shared state. Also drives
/// the engine-running flag and the status indicator.
pub struct ScheduleModule {
    state: Arc<ControllerState>,
    buffers: Arc<OutputBuffers>,
    senses: Arc<SenseStore>,
    indicator: Box<dyn StatusIndicator>,
    period: Duration,
    evaluations: u64,
}

impl ScheduleModule {
    pub fn new(
        state: Arc<ControllerState>,
        buffers: Arc<OutputBuffers>,
        senses: Arc<SenseStore>,
        indicator: Box<dyn StatusIndicator>,
        interval_ms: u64,
    ) -> Self {
        let clamped = interval_ms.clamp(MIN_SCHEDULE_INTERVAL_MS, MAX_SCHEDULE_INTERVAL_MS);
        if clamped != interval_ms {
            log::warn!(
                "schedule interval {}ms out of range, using {}ms",
                interval_ms,
                clamped
            );
        }
        Self {
            state,
            buffers,
            senses,
            indicator,
            period: Duration::from_millis(clamped),
            evaluations: 0,
        }
    }

    /// Stops rendering and forces the output dark while keeping the loop
    /// (and any built patch) alive for when the condition clears.
    fn blackout(&self, reason: &str) {
        if self.state.engine_running() {
            log::info!("schedule: {}; stopping render engine", reason);
        }
        self.state.set_engine_running(false);
        self.buffers.zero_all();
        self.indicator.set_status(STATUS_OFFLINE);
    }

    fn evaluate(&mut self) {
        self.evaluations += 1;
        let config = self.state.config();

        if self.state.unassigned() {
            self.blackout("device is not assigned to a location");
            return;
        }

        let resolver = ScheduleResolver::new(&config);
        let now = resolver.zoned_now();
        let Some(base) = resolver.resolve(now) else {
            self.blackout("no schedule configured");
            return;
        };
        log::debug!("schedule: evaluated at {}", now.format("%a %b %e %T %Z"));

        let layered = OverrideLayer::new(&config, &self.senses).apply(base);
        let instances = PatchBuilder::new(&config).build(&layered);
        let count = instances.len();

        if self.state.install_patch(instances) {
            log::info!("schedule: active patch changed, {} show(s) playing", count);
        }
        if !self.state.engine_running() {
            log::info!("schedule: starting render engine");
            self.state.set_engine_running(true);
        }
        self.indicator.set_status(STATUS_OK);
    }
}

#[async_trait]
impl AsyncModule for ScheduleModule {
    fn id(&self) -> ModuleId {
        ModuleId::Schedule
    }

    async fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        log::info!(
            "schedule module evaluating every {}ms",
            self.period.as_millis()
        );
        Ok(())
    }

    async fn run(
        &mut self,
        mut rx: mpsc::Receiver<ModuleEvent>,
        tx: mpsc::Sender<ModuleMessage>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut ticker = interval(self.period);

        let _ = tx
            .send(ModuleMessage::Status(format!(
                "schedule loop running every {}ms",
                self.period.as_millis()
            )))
            .await;

        loop {
            tokio::select! {
                Some(event) = rx.recv() => {
                    match event {
                        ModuleEvent::ConfigRefreshed => {
                            log::info!("schedule: config refreshed, re-evaluating");
                            self.evaluate();
                        }
                        ModuleEvent::Shutdown => break,
                    }
                }
                _ = ticker.tick() => {
                    self.evaluate();
                }
            }
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        log::info!(
            "schedule module stopped after {} evaluations",
            self.evaluations
        );
        Ok(())
    }

    fn status(&self) -> HashMap<String, String> {
        let mut status = HashMap::new();
        status.insert("period_ms".to_string(), self.period.as_millis().to_string());
        status.insert("evaluations".to_string(), self.evaluations.to_string());
        status.insert(
            "active_shows".to_string(),
            self.state.active_show_count().to_string(),
        );
        status
    }
}
