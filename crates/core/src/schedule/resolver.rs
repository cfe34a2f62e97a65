use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

use crate::assignment::ShowData;
use crate::config::DeviceConfig;

/// Resolves the weekly schedule grid and custom date blocks into the base
/// show assignment for a given instant.
pub struct ScheduleResolver<'a> {
    config: &'a DeviceConfig,
}

impl<'a> ScheduleResolver<'a> {
    pub fn new(config: &'a DeviceConfig) -> Self {
        Self { config }
    }

    /// Current wall-clock time in the installation's configured timezone.
    /// An unknown timezone logs a warning and falls back to UTC.
    pub fn zoned_now(&self) -> DateTime<Tz> {
        let name = self
            .config
            .devicemeta
            .as_ref()
            .map(|m| m.timezone.as_str())
            .unwrap_or("UTC");
        let tz: Tz = name.parse().unwrap_or_else(|_| {
            log::warn!("unknown timezone '{}', using UTC", name);
            chrono_tz::UTC
        });
        Utc::now().with_timezone(&tz)
    }

    /// Base assignment for the given instant, or `None` when the device
    /// has no schedule at all (the caller must blackout).
    pub fn resolve(&self, now: DateTime<Tz>) -> Option<ShowData> {
        let blocks = self.config.schedule_blocks.as_ref()?;

        // Sunday = 1 .. Saturday = 7, matching the schedule grid.
        let weekday = now.weekday().number_from_sunday();
        let hour = now.hour();

        // Unordered scan; with overlapping blocks the last match wins.
        let mut active_event = 0u32;
        for block in blocks {
            if block.day == weekday && block.start <= hour && hour < block.start + block.height {
                active_event = block.event_block_id;
            }
        }

        let mut showdata = ShowData::inactive();
        if active_event > 0 {
            match self.config.event_blocks.iter().find(|b| b.id == active_event) {
                Some(event) => showdata = event.showdata.normalized(),
                None => log::warn!(
                    "schedule: event block {} is scheduled but missing",
                    active_event
                ),
            }
        }

        let minutes = now.hour() * 60 + now.minute();
        for block in &self.config.custom_blocks {
            if block.dates.contains(now.month(), now.day())
                && block.start_time <= minutes
                && minutes < block.end_time
            {
                showdata = showdata.layered(&block.showdata);
            }
        }

        Some(showdata)
    }
}
