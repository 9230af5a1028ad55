//! Behavior configuration
//!
//! Timings, thresholds and clip locations. These are fixed per build; the
//! defaults match the reference appliance.

/// Default output volume when nothing has been saved
pub const DEFAULT_VOLUME: u8 = 11;

/// Maximum length of a clip path
pub const MAX_PATH_LEN: usize = 96;

/// Maximum number of tracks kept from a playlist scan
pub const MAX_TRACKS: usize = 20;

/// Absolute path of a clip on the card
pub type ClipPath = heapless::String<MAX_PATH_LEN>;

/// Copy a path into a [`ClipPath`], or None if it is too long
pub fn clip_path(path: &str) -> Option<ClipPath> {
    let mut out = ClipPath::new();
    out.push_str(path).ok()?;
    Some(out)
}

/// Fixed clip locations on the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClipPaths {
    /// Greeting played once per motion session
    pub greeting: &'static str,
    /// Folder scanned for dhun tracks
    pub dhun_folder: &'static str,
    /// Single bell strike
    pub bell: &'static str,
    /// Folder holding spoken hour numbers (`<folder>/<n>.mp3`)
    pub chime_folder: &'static str,
}

impl Default for ClipPaths {
    fn default() -> Self {
        Self {
            greeting: "/jay-swaminarayan.mp3",
            dhun_folder: "/dhun",
            bell: "/chime/bell.mp3",
            chime_folder: "/chime",
        }
    }
}

/// Media start protocol timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StartTiming {
    /// Connect attempts per start
    pub max_attempts: u8,
    /// Deadline for a running track to stop before connecting anyway
    pub stop_settle_ms: u32,
    /// Poll interval while waiting for stop
    pub stop_poll_ms: u32,
    /// Yield delay before each connect attempt
    pub attempt_yield_ms: u32,
    /// Engine service iterations after a successful connect
    pub settle_polls: u8,
    /// Delay per settle iteration
    pub settle_poll_ms: u32,
    /// Delay between closing and re-mounting storage
    pub remount_delay_ms: u32,
    /// Delay after recovery before the next attempt
    pub retry_delay_ms: u32,
}

impl Default for StartTiming {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            stop_settle_ms: 400,
            stop_poll_ms: 5,
            attempt_yield_ms: 10,
            settle_polls: 5,
            settle_poll_ms: 5,
            remount_delay_ms: 40,
            retry_delay_ms: 80,
        }
    }
}

/// Hourly chime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChimeConfig {
    /// First hour (0-23) that may chime, inclusive
    pub first_hour: u8,
    /// Last hour (0-23) that may chime, inclusive
    pub last_hour: u8,
    /// How many times the spoken hour number is played
    pub number_plays: u8,
}

impl Default for ChimeConfig {
    fn default() -> Self {
        Self {
            first_hour: 0,
            last_hour: 23,
            number_plays: 2,
        }
    }
}

impl ChimeConfig {
    /// Check if the hour lies within the chiming range
    pub const fn covers(&self, hour: u8) -> bool {
        hour >= self.first_hour && hour <= self.last_hour
    }
}

/// Complete behavior configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BehaviorConfig {
    /// Dhun session ends after this long without motion
    pub session_timeout_ms: u32,
    /// Minimum interval between periodic state checks
    pub state_check_interval_ms: u32,
    /// Minimum gap between motion trigger attempts
    pub min_trigger_gap_ms: u32,
    /// Consecutive start failures that force a device restart
    pub restart_failure_threshold: u16,
    /// Media start timing
    pub start: StartTiming,
    /// Chime configuration
    pub chime: ChimeConfig,
    /// Clip locations
    pub paths: ClipPaths,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            session_timeout_ms: 10 * 60 * 1000,
            state_check_interval_ms: 120,
            min_trigger_gap_ms: 500,
            restart_failure_threshold: 5,
            start: StartTiming::default(),
            chime: ChimeConfig::default(),
            paths: ClipPaths::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chime_covers_whole_day() {
        let chime = ChimeConfig::default();
        assert!(chime.covers(0));
        assert!(chime.covers(23));
    }

    #[test]
    fn test_restricted_chime_range() {
        let chime = ChimeConfig {
            first_hour: 6,
            last_hour: 21,
            ..Default::default()
        };
        assert!(!chime.covers(5));
        assert!(chime.covers(6));
        assert!(chime.covers(21));
        assert!(!chime.covers(22));
    }
}
