use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use sacn::source::SacnSource;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

use super::traits::{AsyncModule, ModuleEvent, ModuleId, ModuleMessage};
use crate::config::DeviceMeta;
use crate::output::{OutputBuffers, CHANNELS_PER_UNIVERSE};

/// Fixed sACN transmit period, deliberately faster than the render tick.
pub const DMX_INTERVAL_MS: u64 = 24;

/// The transmit loop: streams every universe's buffer over sACN at a
/// fixed rate, decoupled from rendering. Send failures are logged and the
/// next tick simply retries.
pub struct OutputModule {
    buffers: Arc<OutputBuffers>,
    source: Option<SacnSource>,
    source_name: String,
    priority: u8,
    preview: bool,
    diagnostic_universe: bool,
    bind_addr: SocketAddr,
    destination: Option<SocketAddr>,
    frames_sent: u64,
}

impl OutputModule {
    pub fn new(
        buffers: Arc<OutputBuffers>,
        meta: &DeviceMeta,
        bind_addr: SocketAddr,
        destination: Option<SocketAddr>,
        diagnostic_universe: bool,
    ) -> Self {
        Self {
            buffers,
            source: None,
            source_name: meta.source_name.clone(),
            priority: meta.priority,
            preview: meta.preview,
            diagnostic_universe,
            bind_addr,
            destination,
            frames_sent: 0,
        }
    }

    fn universes(&self) -> Vec<u16> {
        let mut universes: Vec<u16> = (1..=self.buffers.universe_count() as u16).collect();
        if self.diagnostic_universe {
            universes.push(self.buffers.universe_count() as u16 + 1);
        }
        universes
    }

    fn send_frame(&mut self) {
        let universes = self.universes();
        let diagnostic = if self.diagnostic_universe {
            universes.last().copied()
        } else {
            None
        };
        let buffers = &self.buffers;
        let Some(source) = self.source.as_mut() else {
            return;
        };

        for universe in universes {
            let data = if Some(universe) == diagnostic {
                [255u8; CHANNELS_PER_UNIVERSE]
            } else {
                buffers.snapshot(universe as usize)
            };
            if let Err(e) = source.send(
                &[universe],
                &data,
                Some(self.priority),
                self.destination,
                None,
            ) {
                log::warn!("sACN send failed on universe {}: {:?}", universe, e);
            }
        }
        self.frames_sent += 1;
    }
}

#[async_trait]
impl AsyncModule for OutputModule {
    fn id(&self) -> ModuleId {
        ModuleId::Output
    }

    async fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut source = SacnSource::with_ip(&self.source_name, self.bind_addr)
            .map_err(|e| format!("failed to open sACN source: {:?}", e))?;
        let _ = source.set_preview_mode(self.preview);

        for universe in self.universes() {
            source
                .register_universe(universe)
                .map_err(|e| format!("failed to register universe {}: {:?}", universe, e))?;
        }

        log::info!(
            "sACN source '{}' streaming {} universes every {}ms ({})",
            self.source_name,
            self.universes().len(),
            DMX_INTERVAL_MS,
            match self.destination {
                Some(addr) => format!("unicast to {}", addr),
                None => "multicast".to_string(),
            }
        );
        self.source = Some(source);
        Ok(())
    }

    async fn run(
        &mut self,
        mut rx: mpsc::Receiver<ModuleEvent>,
        tx: mpsc::Sender<ModuleMessage>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.source.is_none() {
            return Err("output module not initialized".into());
        }
        let mut ticker = interval(Duration::from_millis(DMX_INTERVAL_MS));
        let frames_per_status = 5000 / DMX_INTERVAL_MS;

        loop {
            tokio::select! {
                Some(event) = rx.recv() => {
                    match event {
                        ModuleEvent::Shutdown => break,
                        _ => {}
                    }
                }
                _ = ticker.tick() => {
                    self.send_frame();
                    if self.frames_sent % frames_per_status == 0 {
                        let _ = tx.send(ModuleMessage::Status(format!(
                            "sACN: {} frames sent on {} universes",
                            self.frames_sent,
                            self.universes().len()
                        ))).await;
                    }
                }
            }
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        log::info!("output module stopped after {} frames", self.frames_sent);
        Ok(())
    }

    fn status(&self) -> HashMap<String, String> {
        let mut status = HashMap::new();
        status.insert("frames_sent".to_string(), self.frames_sent.to_string());
        status.insert(
            "universes".to_string(),
            self.universes().len().to_string(),
        );
        status.insert(
            "destination".to_string(),
            match self.destination {
                Some(addr) => addr.to_string(),
                None => "multicast".to_string(),
            },
        );
        status
    }
}
