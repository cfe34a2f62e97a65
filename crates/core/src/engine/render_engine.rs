use std::sync::Arc;

use anyhow::Result;
use lumen_fixtures::ColorMode;

use crate::config::{DeviceConfig, DeviceMeta};
use crate::output::OutputBuffers;
use crate::patch::{RenderFixture, ShowInstance};
use crate::state::ControllerState;

use super::fade::white_from_rgb;
use super::shows::render_show;

/// Fixed render tick period.
pub const RENDER_INTERVAL_MS: u64 = 50;

/// Evaluates every active show instance once per tick and writes the
/// resulting colors into the output buffers.
pub struct RenderEngine {
    state: Arc<ControllerState>,
    buffers: Arc<OutputBuffers>,
}

impl RenderEngine {
    pub fn new(state: Arc<ControllerState>, buffers: Arc<OutputBuffers>) -> Self {
        Self { state, buffers }
    }

    /// One render tick. Buffers are zeroed first so unpatched zones stay
    /// dark; a failure in one instance is logged and skipped without
    /// touching the rest; highlighted fixtures are forced white last so
    /// highlighting always wins.
    pub fn tick(&self) {
        let config = self.state.config();
        self.buffers.zero_all();

        self.state.with_patch(|instances| {
            for instance in instances.iter_mut() {
                if let Err(e) = Self::render_instance(instance, &config, &self.buffers) {
                    log::error!(
                        "engine: skipping show '{}' (id {}) this tick: {:#}",
                        instance.show.name,
                        instance.show.id,
                        e
                    );
                }
            }
        });

        self.highlight_fixtures(&config);
    }

    fn render_instance(
        instance: &mut ShowInstance,
        config: &DeviceConfig,
        buffers: &OutputBuffers,
    ) -> Result<()> {
        let total_time = instance.show.total_time();
        render_show(&instance.show, &mut instance.counter, &mut instance.fixtures)?;

        if let Some(meta) = config.devicemeta.as_ref() {
            for fixture in &instance.fixtures {
                Self::output_fixture(meta, fixture, buffers);
            }
        }

        instance.counter += 1;
        if instance.counter as f64 > total_time {
            instance.counter = 0;
        }
        Ok(())
    }

    /// Writes one render target into every physical port carrying its
    /// logical universe.
    fn output_fixture(meta: &DeviceMeta, fixture: &RenderFixture, buffers: &OutputBuffers) {
        let [red, green, blue] = fixture.color;
        for port in meta.ports_for_universe(fixture.universe) {
            let address = fixture.start_address as usize;
            buffers.set(port, address, red);
            buffers.set(port, address + 1, green);
            buffers.set(port, address + 2, blue);
            if fixture.color_mode == ColorMode::Rgbw {
                buffers.set(port, address + 3, white_from_rgb(red, green, blue));
            }
        }
    }

    /// Forces full white across the whole channel span of every fixture
    /// flagged for highlighting.
    fn highlight_fixtures(&self, config: &DeviceConfig) {
        let Some(meta) = config.devicemeta.as_ref() else {
            return;
        };

        for fixture in &config.patch.fixtures_list {
            if !fixture.highlight {
                continue;
            }
            let Some(fixture_type) = config.find_fixture_type(fixture.type_id) else {
                log::warn!(
                    "highlight: fixture '{}' references unknown type {}",
                    fixture.label,
                    fixture.type_id
                );
                continue;
            };

            let start = fixture.start_address as usize;
            let end = start + fixture_type.footprint(fixture.quantity) as usize - 1;
            for port in meta.ports_for_universe(fixture.universe) {
                self.buffers.fill(port, start, end, 255);
            }
            log::debug!("highlighting fixture '{}'", fixture.label);
        }
    }
}
