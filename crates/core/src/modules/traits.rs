use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc;

/// The fixed-rate loops that make up the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleId {
    /// Coarse schedule/override re-evaluation.
    Schedule,
    /// Fine render tick.
    Render,
    /// sACN transmit tick.
    Output,
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ModuleId::Schedule => write!(f, "schedule"),
            ModuleId::Render => write!(f, "render"),
            ModuleId::Output => write!(f, "output"),
        }
    }
}

/// Events delivered to module loops.
#[derive(Debug, Clone)]
pub enum ModuleEvent {
    /// The config collaborator installed a fresh snapshot; re-resolve
    /// without waiting for the next coarse tick.
    ConfigRefreshed,
    Shutdown,
}

/// Messages flowing back from modules to the supervisor.
#[derive(Debug)]
pub enum ModuleMessage {
    Status(String),
    Error(String),
}

/// One long-running loop with its own fixed tick.
///
/// `run` must never return on an operational error; failures are logged
/// and the next tick retries. Only a `Shutdown` event ends the loop.
#[async_trait]
pub trait AsyncModule: Send + Sync {
    fn id(&self) -> ModuleId;

    async fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn run(
        &mut self,
        rx: mpsc::Receiver<ModuleEvent>,
        tx: mpsc::Sender<ModuleMessage>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Snapshot of the module's status for diagnostics.
    fn status(&self) -> HashMap<String, String>;
}
