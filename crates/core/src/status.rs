use parking_lot::Mutex;

/// Indicator code for normal operation.
pub const STATUS_OK: char = 'A';
/// Indicator code for no network / unassigned.
pub const STATUS_OFFLINE: char = 'B';

/// Seam to the front-panel status indicator. The serial link to the
/// auxiliary board lives outside the core; implementations only receive
/// the single-character code.
pub trait StatusIndicator: Send + Sync {
    fn set_status(&self, code: char);
}

/// Indicator that records transitions in the log; the stand-in used when
/// no indicator board is attached.
#[derive(Default)]
pub struct LogStatusIndicator {
    last: Mutex<Option<char>>,
}

impl LogStatusIndicator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusIndicator for LogStatusIndicator {
    fn set_status(&self, code: char) {
        let mut last = self.last.lock();
        if *last != Some(code) {
            log::info!("status indicator -> {}", code);
            *last = Some(code);
        }
    }
}
