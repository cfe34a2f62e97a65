use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lumen_core::{
    ConfigManager, ControllerState, LogStatusIndicator, ModuleManager, ModuleMessage,
    OutputBuffers, OutputModule, RenderModule, ScheduleModule, SenseStore,
    DEFAULT_SCHEDULE_INTERVAL_MS, UNIVERSE_COUNT,
};

/// Always-on controller for scheduled architectural lighting.
#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(about = "Lumen lighting controller")]
struct Args {
    /// Path to the device configuration snapshot
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Schedule re-evaluation interval in milliseconds (100-5000)
    #[arg(long, default_value_t = DEFAULT_SCHEDULE_INTERVAL_MS)]
    schedule_interval_ms: u64,

    /// Bind address for the sACN source socket
    #[arg(long, default_value = "0.0.0.0:0")]
    bind: SocketAddr,

    /// Unicast destination; multicast is used when omitted
    #[arg(long)]
    dest: Option<SocketAddr>,

    /// Stream an extra always-white universe for fixture commissioning
    #[arg(long)]
    diagnostic_universe: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    log::info!("lumen controller starting");

    let mut config_manager = ConfigManager::new(Some(args.config.clone()));
    let config = config_manager
        .load()
        .with_context(|| format!("loading {}", args.config.display()))?;
    let meta = config.devicemeta.clone().unwrap_or_default();
    let diagnostic = args.diagnostic_universe || meta.diagnostic_universe;

    let state = Arc::new(ControllerState::new(config));
    let buffers = Arc::new(OutputBuffers::new(UNIVERSE_COUNT));
    let senses = Arc::new(SenseStore::new());

    let mut manager = ModuleManager::new();
    manager.register(Box::new(ScheduleModule::new(
        state.clone(),
        buffers.clone(),
        senses.clone(),
        Box::new(LogStatusIndicator::new()),
        args.schedule_interval_ms,
    )));
    manager.register(Box::new(RenderModule::new(state.clone(), buffers.clone())));
    manager.register(Box::new(OutputModule::new(
        buffers.clone(),
        &meta,
        args.bind,
        args.dest,
        diagnostic,
    )));

    manager
        .initialize()
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    manager.start();

    let mut messages = manager
        .take_message_receiver()
        .context("message receiver already taken")?;
    tokio::spawn(async move {
        while let Some(message) = messages.recv().await {
            match message {
                ModuleMessage::Status(status) => log::info!("{}", status),
                ModuleMessage::Error(error) => log::error!("{}", error),
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    log::info!("shutdown requested");
    manager.shutdown().await;

    Ok(())
}
