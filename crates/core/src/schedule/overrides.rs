use crate::assignment::ShowData;
use crate::config::{DeviceConfig, PortMode};
use crate::sense::{SenseStore, SENSE_PORTS};

/// Layers live overrides onto the scheduled assignment.
///
/// Precedence, innermost last: sensor-toggled overrides in config order,
/// then active web overrides in reverse config order so that entry #1 is
/// applied last and wins.
pub struct OverrideLayer<'a> {
    config: &'a DeviceConfig,
    senses: &'a SenseStore,
}

impl<'a> OverrideLayer<'a> {
    pub fn new(config: &'a DeviceConfig, senses: &'a SenseStore) -> Self {
        Self { config, senses }
    }

    pub fn apply(&self, base: ShowData) -> ShowData {
        let mut result = base;

        for sense in &self.config.senses {
            let Some(reading) = self.senses.latest(sense.id) else {
                log::error!(
                    "sense {} ({}) is assigned to this location but not reporting",
                    sense.id,
                    sense.serial_number
                );
                continue;
            };

            for (port, binding) in sense.data.iter().take(SENSE_PORTS).enumerate() {
                let Some(ovr) = self.config.find_override(binding.override_id) else {
                    continue;
                };
                match binding.mode {
                    PortMode::Toggle => {
                        if reading.port_active(port) {
                            result = result.layered(&ovr.showsdata);
                        }
                    }
                    // Reserved; pulse inputs do not drive overrides yet.
                    PortMode::Pulse => {}
                }
            }
        }

        for web in self.config.web_overrides.iter().rev() {
            if web.active {
                result = result.layered(&web.showsdata);
            }
        }

        result
    }
}
