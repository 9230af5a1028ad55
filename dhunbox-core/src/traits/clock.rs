//! Wall clock trait

/// Errors from reading the wall clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Clock not present or not responding
    Unavailable,
    /// Clock lost power and has not been set since
    NotSet,
}

/// Time of day in 24-hour form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeOfDay {
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
}

impl TimeOfDay {
    /// Create a new time of day
    pub const fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    /// Check that every field is within range
    pub const fn is_valid(&self) -> bool {
        self.hour < 24 && self.minute < 60 && self.second < 60
    }

    /// Hour on a 12-hour dial (1-12)
    ///
    /// Both midnight and noon map to 12.
    pub const fn hour12(&self) -> u8 {
        match self.hour % 12 {
            0 => 12,
            h => h,
        }
    }
}

/// Trait for the real-time clock
pub trait WallClock {
    /// Read the current time of day
    fn now(&mut self) -> Result<TimeOfDay, ClockError>;
}
