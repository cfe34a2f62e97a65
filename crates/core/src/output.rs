use parking_lot::Mutex;

/// DMX channels per universe.
pub const CHANNELS_PER_UNIVERSE: usize = 512;

/// Universes backed by output buffers, one per physical port.
pub const UNIVERSE_COUNT: usize = crate::config::MAX_PORTS;

/// Per-universe channel buffers shared between the render tick (writer)
/// and the transmit tick (reader).
///
/// Each universe sits behind its own mutex so a single channel value can
/// never tear; cross-channel consistency within a frame is not required.
pub struct OutputBuffers {
    universes: Vec<Mutex<[u8; CHANNELS_PER_UNIVERSE]>>,
}

impl OutputBuffers {
    pub fn new(universe_count: usize) -> Self {
        let universes = (0..universe_count)
            .map(|_| Mutex::new([0u8; CHANNELS_PER_UNIVERSE]))
            .collect();
        OutputBuffers { universes }
    }

    pub fn universe_count(&self) -> usize {
        self.universes.len()
    }

    /// Writes one channel value. Universe and channel are 1-based; writes
    /// outside the valid range are silently dropped.
    pub fn set(&self, universe: usize, channel: usize, value: u8) {
        if universe < 1 || universe > self.universes.len() {
            return;
        }
        if channel < 1 || channel > CHANNELS_PER_UNIVERSE {
            return;
        }
        self.universes[universe - 1].lock()[channel - 1] = value;
    }

    /// Fills an inclusive channel range with one value.
    pub fn fill(&self, universe: usize, start: usize, end: usize, value: u8) {
        for channel in start..=end {
            self.set(universe, channel, value);
        }
    }

    pub fn zero_all(&self) {
        for universe in &self.universes {
            *universe.lock() = [0u8; CHANNELS_PER_UNIVERSE];
        }
    }

    /// Copy of one universe's current frame (1-based); zeros for an
    /// unknown universe.
    pub fn snapshot(&self, universe: usize) -> [u8; CHANNELS_PER_UNIVERSE] {
        match universe.checked_sub(1).and_then(|i| self.universes.get(i)) {
            Some(buffer) => *buffer.lock(),
            None => [0u8; CHANNELS_PER_UNIVERSE],
        }
    }
}
