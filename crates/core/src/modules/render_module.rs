use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

use super::traits::{AsyncModule, ModuleEvent, ModuleId, ModuleMessage};
use crate::engine::render_engine::{RenderEngine, RENDER_INTERVAL_MS};
use crate::output::OutputBuffers;
use crate::state::ControllerState;

/// The fine loop: one engine tick every [`RENDER_INTERVAL_MS`]. While the
/// engine is stopped the buffers are held at zero so the transmitter
/// keeps streaming a blackout frame.
pub struct RenderModule {
    engine: RenderEngine,
    state: Arc<ControllerState>,
    buffers: Arc<OutputBuffers>,
    ticks: u64,
}

impl RenderModule {
    pub fn new(state: Arc<ControllerState>, buffers: Arc<OutputBuffers>) -> Self {
        Self {
            engine: RenderEngine::new(state.clone(), buffers.clone()),
            state,
            buffers,
            ticks: 0,
        }
    }
}

#[async_trait]
impl AsyncModule for RenderModule {
    fn id(&self) -> ModuleId {
        ModuleId::Render
    }

    async fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        log::info!("render engine ticking every {}ms", RENDER_INTERVAL_MS);
        Ok(())
    }

    async fn run(
        &mut self,
        mut rx: mpsc::Receiver<ModuleEvent>,
        tx: mpsc::Sender<ModuleMessage>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut ticker = interval(Duration::from_millis(RENDER_INTERVAL_MS));

        let _ = tx
            .send(ModuleMessage::Status(format!(
                "render loop running every {}ms",
                RENDER_INTERVAL_MS
            )))
            .await;

        loop {
            tokio::select! {
                Some(event) = rx.recv() => {
                    match event {
                        ModuleEvent::Shutdown => break,
                        _ => {}
                    }
                }
                _ = ticker.tick() => {
                    if self.state.engine_running() {
                        self.engine.tick();
                    } else {
                        self.buffers.zero_all();
                    }
                    self.ticks += 1;
                }
            }
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        log::info!("render module stopped after {} ticks", self.ticks);
        Ok(())
    }

    fn status(&self) -> HashMap<String, String> {
        let mut status = HashMap::new();
        status.insert("ticks".to_string(), self.ticks.to_string());
        status.insert(
            "running".to_string(),
            self.state.engine_running().to_string(),
        );
        status
    }
}
