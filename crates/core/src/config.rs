use std::fs;
use std::path::{Path, PathBuf};

use lumen_fixtures::{FixtureType, Patch};
use serde::{Deserialize, Serialize};

use crate::assignment::ShowData;
use crate::show::Show;

/// Physical output ports available on the controller.
pub const MAX_PORTS: usize = 8;

/// The full configuration snapshot for one controller.
///
/// Owned by the remote-sync collaborator and treated as immutable between
/// refreshes; every section is optional so a partially provisioned device
/// degrades to a blackout instead of failing to parse.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub devicemeta: Option<DeviceMeta>,
    pub schedule_blocks: Option<Vec<ScheduleBlock>>,
    pub event_blocks: Vec<EventBlock>,
    pub custom_blocks: Vec<CustomBlock>,
    pub senses: Vec<Sense>,
    pub overrides: Vec<Override>,
    pub web_overrides: Vec<WebOverride>,
    pub shows: Vec<Show>,
    pub fixture_types: Vec<FixtureType>,
    pub patch: Patch,
}

impl DeviceConfig {
    pub fn find_show(&self, id: u32) -> Option<&Show> {
        self.shows.iter().find(|s| s.id == id)
    }

    pub fn find_fixture_type(&self, id: u32) -> Option<&FixtureType> {
        self.fixture_types.iter().find(|t| t.id == id)
    }

    pub fn find_override(&self, id: u32) -> Option<&Override> {
        self.overrides.iter().find(|o| o.id == id)
    }
}

/// Installation-level settings: timezone, output routing and the sACN
/// source identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceMeta {
    pub name: String,
    /// IANA timezone the schedule is evaluated in.
    pub timezone: String,
    /// `ports[i]` is the logical universe carried on physical port `i + 1`;
    /// 0 leaves the port dark. At most [`MAX_PORTS`] entries are honored.
    pub ports: Vec<u16>,
    pub source_name: String,
    pub priority: u8,
    pub preview: bool,
    /// Stream an extra always-white universe for fixture commissioning.
    pub diagnostic_universe: bool,
}

impl Default for DeviceMeta {
    fn default() -> Self {
        DeviceMeta {
            name: String::new(),
            timezone: "UTC".to_string(),
            ports: Vec::new(),
            source_name: "Lumen Controller".to_string(),
            priority: 100,
            preview: false,
            diagnostic_universe: false,
        }
    }
}

impl DeviceMeta {
    fn ports(&self) -> &[u16] {
        &self.ports[..self.ports.len().min(MAX_PORTS)]
    }

    /// Physical ports (1-based) that carry the given logical universe.
    pub fn ports_for_universe(&self, universe: u16) -> impl Iterator<Item = usize> + '_ {
        self.ports()
            .iter()
            .enumerate()
            .filter(move |(_, &u)| u != 0 && u == universe)
            .map(|(i, _)| i + 1)
    }
}

/// One cell on the weekly schedule grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    /// Day of week, Sunday = 1 through Saturday = 7.
    pub day: u32,
    /// Starting clock hour, 0-23.
    pub start: u32,
    /// Duration in hours.
    pub height: u32,
    pub event_block_id: u32,
}

/// The show assignment a schedule block points at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventBlock {
    pub id: u32,
    pub showdata: ShowData,
}

/// Date scope of a custom block: a single calendar day or an inclusive
/// range that may wrap the year boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomDates {
    Range {
        start_month: u32,
        start_day: u32,
        end_month: u32,
        end_day: u32,
    },
    Single {
        month: u32,
        day: u32,
    },
}

impl CustomDates {
    pub fn contains(&self, month: u32, day: u32) -> bool {
        match *self {
            CustomDates::Single { month: m, day: d } => m == month && d == day,
            CustomDates::Range {
                start_month,
                start_day,
                end_month,
                end_day,
            } => {
                let start = (start_month, start_day);
                let end = (end_month, end_day);
                let date = (month, day);
                if end < start {
                    // Wraps the year boundary, e.g. Dec 28 - Jan 3.
                    date >= start || date <= end
                } else {
                    date >= start && date <= end
                }
            }
        }
    }
}

/// A date-scoped assignment layered over the weekly schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomBlock {
    #[serde(flatten)]
    pub dates: CustomDates,
    /// Window start, minutes since midnight.
    pub start_time: u32,
    /// Window end (exclusive), minutes since midnight.
    pub end_time: u32,
    pub showdata: ShowData,
}

/// Input mode of one sense port. Pulse mode is reserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortMode {
    Toggle,
    Pulse,
}

/// Binding of one sense input port to an override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensePort {
    pub mode: PortMode,
    pub override_id: u32,
}

/// One sense unit assigned to this installation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sense {
    pub id: u32,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub data: Vec<SensePort>,
}

/// A show assignment that sensors can toggle live.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Override {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub showsdata: ShowData,
}

/// An operator-activated override; list position is its priority, with
/// entry #1 carrying final precedence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebOverride {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    pub showsdata: ShowData,
}

/// Loads and persists the local mirror of the configuration snapshot so
/// the controller boots into its last-known state without network.
pub struct ConfigManager {
    config_path: PathBuf,
    config: DeviceConfig,
}

impl ConfigManager {
    /// Defaults to `config.json` next to the process, matching how the
    /// device image lays out its working directory.
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path: config_path.unwrap_or_else(|| PathBuf::from("config.json")),
            config: DeviceConfig::default(),
        }
    }

    /// Loads the snapshot from disk. A missing file is not an error: the
    /// device simply boots unprovisioned and blacks out until a snapshot
    /// arrives.
    pub fn load(&mut self) -> Result<DeviceConfig, ConfigError> {
        if !self.config_path.exists() {
            log::warn!(
                "no config snapshot at {}; starting unprovisioned",
                self.config_path.display()
            );
            self.config = DeviceConfig::default();
            return Ok(self.config.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;
        self.config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Ok(self.config.clone())
    }

    /// Persists the current snapshot.
    pub fn save(&self) -> Result<(), ConfigError> {
        let content = serde_json::to_string(&self.config)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        Ok(())
    }

    /// Installs a fresh snapshot (from the sync collaborator) and mirrors
    /// it to disk.
    pub fn update(&mut self, config: DeviceConfig) -> Result<(), ConfigError> {
        self.config = config;
        self.save()
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(msg) => write!(f, "failed to read config file: {}", msg),
            ConfigError::WriteError(msg) => write!(f, "failed to write config file: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "failed to parse config file: {}", msg),
            ConfigError::SerializeError(msg) => write!(f, "failed to serialize config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
