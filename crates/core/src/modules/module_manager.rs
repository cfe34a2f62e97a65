use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::traits::{AsyncModule, ModuleEvent, ModuleId, ModuleMessage};

/// Spawns each registered module into its own task and fans events out to
/// them; status and error messages funnel back through one channel.
pub struct ModuleManager {
    modules: Vec<Box<dyn AsyncModule>>,
    handles: Vec<(ModuleId, JoinHandle<()>)>,
    event_senders: HashMap<ModuleId, mpsc::Sender<ModuleEvent>>,
    message_rx: Option<mpsc::Receiver<ModuleMessage>>,
    message_tx: mpsc::Sender<ModuleMessage>,
}

impl ModuleManager {
    pub fn new() -> Self {
        let (message_tx, message_rx) = mpsc::channel(256);
        Self {
            modules: Vec::new(),
            handles: Vec::new(),
            event_senders: HashMap::new(),
            message_rx: Some(message_rx),
            message_tx,
        }
    }

    pub fn register(&mut self, module: Box<dyn AsyncModule>) {
        self.modules.push(module);
    }

    pub async fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        for module in &mut self.modules {
            let id = module.id();
            module
                .initialize()
                .await
                .map_err(|e| format!("{} module failed to initialize: {}", id, e))?;
            log::info!("{} module initialized", id);
        }
        Ok(())
    }

    /// Starts every registered module. Each gets its own event channel; a
    /// module that returns an error reports it and dies alone.
    pub fn start(&mut self) {
        for mut module in self.modules.drain(..) {
            let id = module.id();
            let (event_tx, event_rx) = mpsc::channel(64);
            let message_tx = self.message_tx.clone();

            let handle = tokio::spawn(async move {
                if let Err(e) = module.run(event_rx, message_tx.clone()).await {
                    let _ = message_tx
                        .send(ModuleMessage::Error(format!("{} module died: {}", id, e)))
                        .await;
                }
                if let Err(e) = module.shutdown().await {
                    log::error!("{} module shutdown error: {}", id, e);
                }
            });

            self.event_senders.insert(id, event_tx);
            self.handles.push((id, handle));
        }
    }

    pub async fn send_to(&self, id: ModuleId, event: ModuleEvent) -> Result<(), String> {
        let sender = self
            .event_senders
            .get(&id)
            .ok_or_else(|| format!("{} module not running", id))?;
        sender
            .send(event)
            .await
            .map_err(|e| format!("{} module unreachable: {}", id, e))
    }

    pub async fn broadcast(&self, event: ModuleEvent) {
        for (id, sender) in &self.event_senders {
            if let Err(e) = sender.send(event.clone()).await {
                log::warn!("failed to deliver event to {} module: {}", id, e);
            }
        }
    }

    /// The message funnel; can only be taken once.
    pub fn take_message_receiver(&mut self) -> Option<mpsc::Receiver<ModuleMessage>> {
        self.message_rx.take()
    }

    pub async fn shutdown(&mut self) {
        log::info!("shutting down modules");
        self.broadcast(ModuleEvent::Shutdown).await;

        for (id, handle) in self.handles.drain(..) {
            if let Err(e) = handle.await {
                log::error!("{} module task join error: {}", id, e);
            }
        }
        self.event_senders.clear();
        log::info!("all modules stopped");
    }
}

impl Default for ModuleManager {
    fn default() -> Self {
        Self::new()
    }
}
