//! Do-not-disturb window

use crate::config::DndSettings;
use crate::traits::{ClockError, TimeOfDay};

/// Maps the current hour to "playback suppressed"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DndWindow {
    settings: DndSettings,
}

impl DndWindow {
    /// Create a window from settings
    pub const fn new(settings: DndSettings) -> Self {
        Self { settings }
    }

    /// Current settings
    pub fn settings(&self) -> &DndSettings {
        &self.settings
    }

    /// Replace the settings
    pub fn set_settings(&mut self, settings: DndSettings) {
        self.settings = settings;
    }

    /// Check if playback is suppressed at `hour` (0-23)
    ///
    /// A window whose start is after its end wraps past midnight
    /// (22 -> 6 covers 22:00..05:59). Equal start and end is empty.
    pub fn is_suppressed(&self, hour: u8) -> bool {
        if !self.settings.enabled {
            return false;
        }

        let start = self.settings.start_hour;
        let end = self.settings.end_hour;

        if start > end {
            hour >= start || hour < end
        } else {
            hour >= start && hour < end
        }
    }

    /// Check suppression for a clock reading
    ///
    /// An unreadable clock never suppresses.
    pub fn is_suppressed_at(&self, time: Result<TimeOfDay, ClockError>) -> bool {
        match time {
            Ok(t) => self.is_suppressed(t.hour),
            Err(_) => false,
        }
    }
}
