use serde::{Deserialize, Serialize};

/// Channel layout of a fixture's addressable output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "RGBW")]
    Rgbw,
}

impl ColorMode {
    pub fn channel_width(&self) -> u16 {
        match self {
            ColorMode::Rgb => 3,
            ColorMode::Rgbw => 4,
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ColorMode::Rgb => write!(f, "RGB"),
            ColorMode::Rgbw => write!(f, "RGBW"),
        }
    }
}

/// A fixture profile: how one catalog entry expands into addressable
/// render targets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixtureType {
    pub id: u32,
    pub name: String,
    /// Total DMX channels occupied by one physical fixture.
    pub channels: u16,
    /// Independently addressable segments within those channels.
    #[serde(default = "default_segments")]
    pub segments: u16,
    /// One catalog entry stands for `quantity` identical fixtures patched
    /// back to back (pixel nodes, festoon runs).
    #[serde(default)]
    pub multi_count_one_fixture: bool,
    pub color_mode: ColorMode,
}

fn default_segments() -> u16 {
    1
}

impl FixtureType {
    /// Channels covered by one addressable segment.
    pub fn channels_per_segment(&self) -> u16 {
        if self.segments == 0 {
            self.channels
        } else {
            self.channels / self.segments
        }
    }

    /// Full channel span of one patched instance of this type.
    pub fn footprint(&self, quantity: u16) -> u16 {
        if self.multi_count_one_fixture {
            self.channels * quantity
        } else {
            self.channels
        }
    }
}

/// One patched fixture in the installation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixtureInstance {
    pub id: u32,
    #[serde(default)]
    pub label: String,
    pub universe: u16,
    /// 1-based DMX start address.
    pub start_address: u16,
    /// 1-based zone this fixture belongs to.
    pub zone_number: usize,
    /// 1-based group within the zone.
    pub group_number: usize,
    /// Reference into the fixture type catalog.
    pub type_id: u32,
    #[serde(default = "default_quantity")]
    pub quantity: u16,
    /// Force full white on the whole channel span, for locating fixtures
    /// during commissioning.
    #[serde(default)]
    pub highlight: bool,
}

fn default_quantity() -> u16 {
    1
}

/// A logical grouping of fixtures that plays one show, or splits into
/// named groups each playing their own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

/// The static patch: zones and the fixtures assigned to them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    #[serde(default)]
    pub zones_list: Vec<Zone>,
    #[serde(default)]
    pub fixtures_list: Vec<FixtureInstance>,
}

impl Patch {
    pub fn fixtures_in_zone(&self, zone_number: usize) -> Vec<&FixtureInstance> {
        self.fixtures_list
            .iter()
            .filter(|f| f.zone_number == zone_number)
            .collect()
    }

    pub fn fixtures_in_group(
        &self,
        zone_number: usize,
        group_number: usize,
    ) -> Vec<&FixtureInstance> {
        self.fixtures_list
            .iter()
            .filter(|f| f.zone_number == zone_number && f.group_number == group_number)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_type() -> FixtureType {
        FixtureType {
            id: 3,
            name: "LED Strip 4seg".to_string(),
            channels: 12,
            segments: 4,
            multi_count_one_fixture: false,
            color_mode: ColorMode::Rgb,
        }
    }

    #[test]
    fn segment_stride() {
        assert_eq!(strip_type().channels_per_segment(), 3);
    }

    #[test]
    fn footprint_multiplies_only_for_multi_count() {
        let mut t = strip_type();
        assert_eq!(t.footprint(6), 12);

        t.multi_count_one_fixture = true;
        assert_eq!(t.footprint(6), 72);
    }

    #[test]
    fn group_lookup() {
        let patch = Patch {
            zones_list: vec![Zone {
                name: "Facade".to_string(),
                groups: vec!["East".to_string(), "West".to_string()],
            }],
            fixtures_list: vec![
                FixtureInstance {
                    id: 1,
                    label: "F1".to_string(),
                    universe: 1,
                    start_address: 1,
                    zone_number: 1,
                    group_number: 1,
                    type_id: 3,
                    quantity: 1,
                    highlight: false,
                },
                FixtureInstance {
                    id: 2,
                    label: "F2".to_string(),
                    universe: 1,
                    start_address: 13,
                    zone_number: 1,
                    group_number: 2,
                    type_id: 3,
                    quantity: 1,
                    highlight: false,
                },
            ],
        };

        assert_eq!(patch.fixtures_in_zone(1).len(), 2);
        assert_eq!(patch.fixtures_in_group(1, 2).len(), 1);
        assert!(patch.fixtures_in_group(2, 1).is_empty());
    }

    #[test]
    fn color_mode_names_round_trip() {
        let json = serde_json::to_string(&ColorMode::Rgbw).unwrap();
        assert_eq!(json, "\"RGBW\"");
        let back: ColorMode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ColorMode::Rgbw);
    }
}
