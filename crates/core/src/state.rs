use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::config::DeviceConfig;
use crate::patch::{same_shape, ShowInstance};

/// State shared between the three scheduler loops: the current config
/// snapshot, the active patch, and the engine-running flag.
///
/// The patch handoff is an atomic snapshot swap; a rebuild that is
/// structurally identical to the running patch is discarded so live
/// animation counters never reset without cause.
pub struct ControllerState {
    config: RwLock<Arc<DeviceConfig>>,
    patch: Mutex<Vec<ShowInstance>>,
    engine_running: AtomicBool,
    unassigned: AtomicBool,
}

impl ControllerState {
    pub fn new(config: DeviceConfig) -> Self {
        ControllerState {
            config: RwLock::new(Arc::new(config)),
            patch: Mutex::new(Vec::new()),
            engine_running: AtomicBool::new(true),
            unassigned: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> Arc<DeviceConfig> {
        self.config.read().clone()
    }

    pub fn install_config(&self, config: DeviceConfig) {
        *self.config.write() = Arc::new(config);
    }

    /// Swaps in a freshly built patch. Returns whether the structure
    /// actually changed; when it did not, the running instances (and
    /// their counters) are kept untouched.
    pub fn install_patch(&self, new: Vec<ShowInstance>) -> bool {
        let mut patch = self.patch.lock();
        if same_shape(&patch, &new) {
            return false;
        }
        *patch = new;
        true
    }

    /// Runs `f` against the active patch under the lock. The render tick
    /// uses this to mutate counters and colors in place.
    pub fn with_patch<R>(&self, f: impl FnOnce(&mut Vec<ShowInstance>) -> R) -> R {
        f(&mut self.patch.lock())
    }

    pub fn active_show_count(&self) -> usize {
        self.patch.lock().len()
    }

    pub fn engine_running(&self) -> bool {
        self.engine_running.load(Ordering::Relaxed)
    }

    pub fn set_engine_running(&self, running: bool) {
        self.engine_running.store(running, Ordering::Relaxed);
    }

    pub fn unassigned(&self) -> bool {
        self.unassigned.load(Ordering::Relaxed)
    }

    pub fn set_unassigned(&self, unassigned: bool) {
        self.unassigned.store(unassigned, Ordering::Relaxed);
    }
}
