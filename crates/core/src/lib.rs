pub use assignment::{ShowData, ZoneSlot, ZONE_COUNT};
pub use config::{
    ConfigError, ConfigManager, CustomBlock, CustomDates, DeviceConfig, DeviceMeta, EventBlock,
    Override, PortMode, ScheduleBlock, Sense, SensePort, WebOverride, MAX_PORTS,
};
pub use engine::fade::{sine_fade, white_from_rgb};
pub use engine::render_engine::{RenderEngine, RENDER_INTERVAL_MS};
pub use engine::shows::{mirror_index, render_show};
pub use modules::{
    AsyncModule, ModuleEvent, ModuleId, ModuleManager, ModuleMessage, OutputModule, RenderModule,
    ScheduleModule, DEFAULT_SCHEDULE_INTERVAL_MS, DMX_INTERVAL_MS,
};
pub use output::{OutputBuffers, CHANNELS_PER_UNIVERSE, UNIVERSE_COUNT};
pub use patch::{same_shape, PatchBuilder, RenderFixture, ShowInstance};
pub use schedule::overrides::OverrideLayer;
pub use schedule::resolver::ScheduleResolver;
pub use sense::{SenseReading, SenseStore, SENSE_PORTS};
pub use show::Show;
pub use state::ControllerState;
pub use status::{LogStatusIndicator, StatusIndicator, STATUS_OFFLINE, STATUS_OK};

mod assignment;
mod config;
mod engine;
mod modules;
mod output;
mod patch;
mod schedule;
mod sense;
mod show;
mod state;
mod status;
