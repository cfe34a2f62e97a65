use lumen_fixtures::{ColorMode, FixtureInstance};

use crate::assignment::{ShowData, ZoneSlot};
use crate::config::DeviceConfig;
use crate::show::Show;

/// One concrete render target: a segment of DMX channels holding a color.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFixture {
    pub universe: u16,
    pub start_address: u16,
    pub color_mode: ColorMode,
    /// Current RGB value; the only state the render tick mutates.
    pub color: [u8; 3],
}

impl RenderFixture {
    /// Same channel target, ignoring the live color.
    fn same_target(&self, other: &RenderFixture) -> bool {
        self.universe == other.universe
            && self.start_address == other.start_address
            && self.color_mode == other.color_mode
    }
}

/// A show bound to the fixtures it currently plays on.
#[derive(Clone, Debug)]
pub struct ShowInstance {
    pub show: Show,
    /// Animation phase, advancing one step per render tick.
    pub counter: u32,
    pub fixtures: Vec<RenderFixture>,
}

impl ShowInstance {
    /// Structural identity: same show, same targets. Live counters and
    /// colors are runtime state and do not participate.
    pub fn same_shape(&self, other: &ShowInstance) -> bool {
        self.show == other.show
            && self.fixtures.len() == other.fixtures.len()
            && self
                .fixtures
                .iter()
                .zip(&other.fixtures)
                .all(|(a, b)| a.same_target(b))
    }
}

/// Structural identity over whole instance lists.
pub fn same_shape(a: &[ShowInstance], b: &[ShowInstance]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
}

/// Expands the final zone assignment against the fixture catalog into the
/// list of show instances the engine will evaluate.
pub struct PatchBuilder<'a> {
    config: &'a DeviceConfig,
}

impl<'a> PatchBuilder<'a> {
    pub fn new(config: &'a DeviceConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, showdata: &ShowData) -> Vec<ShowInstance> {
        let mut instances = Vec::new();

        for (z, zone) in self.config.patch.zones_list.iter().enumerate() {
            match showdata.slot(z) {
                ZoneSlot::PerGroup(groups) if !groups.is_empty() => {
                    for g in 0..zone.groups.len() {
                        let fixtures = self.config.patch.fixtures_in_group(z + 1, g + 1);
                        if fixtures.is_empty() {
                            continue;
                        }
                        let show_id = groups.get(g).copied().unwrap_or(0);
                        if show_id < 1 {
                            continue;
                        }
                        self.push_instance(&mut instances, show_id, &fixtures);
                    }
                }
                slot => {
                    let show_id = match slot {
                        ZoneSlot::Single(id) => id,
                        ZoneSlot::PerGroup(_) => 0,
                    };
                    if show_id < 1 {
                        continue;
                    }
                    let fixtures = self.config.patch.fixtures_in_zone(z + 1);
                    if fixtures.is_empty() {
                        continue;
                    }
                    self.push_instance(&mut instances, show_id, &fixtures);
                }
            }
        }

        instances
    }

    fn push_instance(
        &self,
        instances: &mut Vec<ShowInstance>,
        show_id: u32,
        fixtures: &[&FixtureInstance],
    ) {
        let Some(show) = self.config.find_show(show_id) else {
            log::warn!("patch: show {} is assigned but not in the show list", show_id);
            return;
        };
        let targets = self.expand(fixtures);
        if targets.is_empty() {
            return;
        }
        instances.push(ShowInstance {
            show: show.clone(),
            counter: 0,
            fixtures: targets,
        });
    }

    /// Expands catalog fixtures into addressable render targets: one per
    /// counted unit for multi-count types, one per segment for segmented
    /// types, otherwise one per fixture.
    fn expand(&self, fixtures: &[&FixtureInstance]) -> Vec<RenderFixture> {
        let mut targets = Vec::new();

        for fixture in fixtures {
            let Some(fixture_type) = self.config.find_fixture_type(fixture.type_id) else {
                log::warn!(
                    "patch: fixture '{}' references unknown type {}",
                    fixture.label,
                    fixture.type_id
                );
                continue;
            };
            let stride = fixture_type.channels_per_segment();
            let units = if fixture_type.multi_count_one_fixture {
                fixture.quantity
            } else {
                fixture_type.segments.max(1)
            };

            for i in 0..units {
                targets.push(RenderFixture {
                    universe: fixture.universe,
                    start_address: fixture.start_address + stride * i,
                    color_mode: fixture_type.color_mode,
                    color: [0, 0, 0],
                });
            }
        }

        targets
    }
}

#[cfg(test)]
mod tests {
    use lumen_fixtures::{FixtureType, Patch, Zone};

    use super::*;
    use crate::assignment::ZoneSlot;

    fn show(id: u32) -> Show {
        Show {
            id,
            name: format!("Show {}", id),
            kind: 1,
            colors_list: vec![[255, 0, 0]],
            speed: 50,
            size: 1,
            direction: 1,
            splits: 1,
        }
    }

    fn fixture(id: u32, zone: usize, group: usize, type_id: u32, address: u16) -> FixtureInstance {
        FixtureInstance {
            id,
            label: format!("Fixture {}", id),
            universe: 1,
            start_address: address,
            zone_number: zone,
            group_number: group,
            type_id,
            quantity: 3,
            highlight: false,
        }
    }

    fn config() -> DeviceConfig {
        DeviceConfig {
            shows: vec![show(5), show(7)],
            fixture_types: vec![
                FixtureType {
                    id: 1,
                    name: "Plain RGB".to_string(),
                    channels: 3,
                    segments: 1,
                    multi_count_one_fixture: false,
                    color_mode: ColorMode::Rgb,
                },
                FixtureType {
                    id: 2,
                    name: "Four segment bar".to_string(),
                    channels: 12,
                    segments: 4,
                    multi_count_one_fixture: false,
                    color_mode: ColorMode::Rgb,
                },
                FixtureType {
                    id: 3,
                    name: "Node string".to_string(),
                    channels: 4,
                    segments: 1,
                    multi_count_one_fixture: true,
                    color_mode: ColorMode::Rgbw,
                },
            ],
            patch: Patch {
                zones_list: vec![
                    Zone {
                        name: "Facade".to_string(),
                        groups: vec!["East".to_string(), "West".to_string()],
                    },
                    Zone {
                        name: "Canopy".to_string(),
                        groups: vec![],
                    },
                ],
                fixtures_list: vec![
                    fixture(1, 1, 1, 1, 1),
                    fixture(2, 1, 2, 2, 10),
                    fixture(3, 2, 1, 3, 100),
                ],
            },
            ..DeviceConfig::default()
        }
    }

    #[test]
    fn whole_zone_assignment_builds_one_instance() {
        let config = config();
        let data = ShowData::from_slots(vec![ZoneSlot::Single(5)]);
        let instances = PatchBuilder::new(&config).build(&data);

        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].show.id, 5);
        // plain fixture + 4 segments
        assert_eq!(instances[0].fixtures.len(), 5);
    }

    #[test]
    fn group_assignment_scopes_fixtures() {
        let config = config();
        let data = ShowData::from_slots(vec![ZoneSlot::PerGroup(vec![5, 7])]);
        let instances = PatchBuilder::new(&config).build(&data);

        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].show.id, 5);
        assert_eq!(instances[0].fixtures.len(), 1);
        assert_eq!(instances[1].show.id, 7);
        assert_eq!(instances[1].fixtures.len(), 4);
        assert_eq!(
            instances[1]
                .fixtures
                .iter()
                .map(|f| f.start_address)
                .collect::<Vec<_>>(),
            vec![10, 13, 16, 19]
        );
    }

    #[test]
    fn multi_count_expands_by_quantity() {
        let config = config();
        let data = ShowData::from_slots(vec![ZoneSlot::Single(0), ZoneSlot::Single(7)]);
        let instances = PatchBuilder::new(&config).build(&data);

        assert_eq!(instances.len(), 1);
        let addresses: Vec<u16> = instances[0].fixtures.iter().map(|f| f.start_address).collect();
        assert_eq!(addresses, vec![100, 104, 108]);
        assert!(instances[0]
            .fixtures
            .iter()
            .all(|f| f.color_mode == ColorMode::Rgbw));
    }

    #[test]
    fn inactive_and_dangling_assignments_build_nothing() {
        let config = config();

        let inactive = ShowData::inactive();
        assert!(PatchBuilder::new(&config).build(&inactive).is_empty());

        let dangling = ShowData::from_slots(vec![ZoneSlot::Single(99)]);
        assert!(PatchBuilder::new(&config).build(&dangling).is_empty());
    }

    #[test]
    fn group_zeros_are_skipped() {
        let config = config();
        let data = ShowData::from_slots(vec![ZoneSlot::PerGroup(vec![0, 7])]);
        let instances = PatchBuilder::new(&config).build(&data);

        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].show.id, 7);
    }

    #[test]
    fn same_shape_ignores_runtime_state() {
        let config = config();
        let data = ShowData::from_slots(vec![ZoneSlot::Single(5)]);
        let a = PatchBuilder::new(&config).build(&data);
        let mut b = PatchBuilder::new(&config).build(&data);

        b[0].counter = 42;
        b[0].fixtures[0].color = [255, 128, 0];
        assert!(same_shape(&a, &b));

        let other = PatchBuilder::new(&config)
            .build(&ShowData::from_slots(vec![ZoneSlot::PerGroup(vec![5, 7])]));
        assert!(!same_shape(&a, &other));
    }
}
