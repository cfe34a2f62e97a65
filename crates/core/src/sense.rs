use std::collections::HashMap;

use parking_lot::RwLock;

/// Digital input ports on one sense unit.
pub const SENSE_PORTS: usize = 16;

/// Latest decoded state of one sense unit's input ports (1 = active).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SenseReading {
    pub ports: Vec<u8>,
}

impl SenseReading {
    pub fn port_active(&self, port: usize) -> bool {
        self.ports.get(port).copied().unwrap_or(0) == 1
    }
}

/// Store of decoded sense telemetry, keyed by sense id.
///
/// The wire listener lives outside the core and deposits readings here;
/// the resolver only ever reads. A sense that has never reported is
/// simply absent.
#[derive(Default)]
pub struct SenseStore {
    readings: RwLock<HashMap<u32, SenseReading>>,
}

impl SenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&self, sense_id: u32, ports: Vec<u8>) {
        self.readings
            .write()
            .insert(sense_id, SenseReading { ports });
    }

    pub fn latest(&self, sense_id: u32) -> Option<SenseReading> {
        self.readings.read().get(&sense_id).cloned()
    }
}
