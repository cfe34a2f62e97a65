use serde::{Deserialize, Serialize};

/// Replication factors selectable by a show's 1-based `splits` index.
pub const SPLITS_OPTIONS: [u32; 3] = [1, 2, 4];

/// One animation program: algorithm type plus its color and shape
/// parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Algorithm selector, 1-6.
    #[serde(rename = "type")]
    pub kind: u8,
    pub colors_list: Vec<[u8; 3]>,
    /// 1 (slowest) to 100 (fastest).
    pub speed: u8,
    /// Segment size in pixels; 11-20 select a percentage of the run.
    #[serde(default = "default_size")]
    pub size: u8,
    /// 0 reversed, 1 forward, 2 mirrored, 3 mirrored with reversed halves.
    #[serde(default)]
    pub direction: u8,
    /// 1-based index into [`SPLITS_OPTIONS`].
    #[serde(default = "default_splits")]
    pub splits: u8,
}

fn default_size() -> u8 {
    1
}

fn default_splits() -> u8 {
    1
}

impl Show {
    /// Ticks for one full animation cycle; larger is slower.
    ///
    /// Speed maps through an exponential curve so the top of the range
    /// stays usable, with extra time added per color in the list.
    pub fn total_time(&self) -> f64 {
        let speed_range = (101 - self.speed as i32) as f64;
        let exp = if speed_range >= 90.0 {
            (speed_range - 80.0).powf(2.3)
        } else {
            speed_range.powf(1.1)
        };
        exp.round() + (self.colors_list.len().saturating_sub(1) * 5) as f64
    }

    /// Resolved replication factor, or `None` for an out-of-range index.
    pub fn splits_factor(&self) -> Option<u32> {
        let index = (self.splits as usize).checked_sub(1)?;
        SPLITS_OPTIONS.get(index).copied()
    }
}
