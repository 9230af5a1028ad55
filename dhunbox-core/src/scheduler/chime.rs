//! Hourly chime scheduling
//!
//! A chime fires once in a short window at the top of each hour: one bell
//! strike per 12-hour hour number, then the spoken number played a fixed
//! number of times. Whatever was playing is recorded so it can be resumed.

use core::fmt::Write;

use crate::config::{ChimeConfig, ClipPath};
use crate::traits::TimeOfDay;

/// Chime sub-sequence phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChimePhase {
    /// Striking the bell
    Bells,
    /// Speaking the hour number
    Number,
}

/// What to do after the current chime clip finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChimeStep {
    /// Strike the bell again
    StrikeBell,
    /// Play the spoken hour number
    SpeakNumber,
    /// Sequence finished
    Complete,
}

/// Playback state a preempted clip returns to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResumeTarget {
    /// A clip started outside a session was interrupted
    Idle,
    /// The greeting was interrupted
    Greeting,
    /// A dhun track was interrupted
    Dhun,
}

/// What was playing when a chime took over
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Preemption {
    /// Interrupted clip
    pub path: ClipPath,
    /// State to return to
    pub resume: ResumeTarget,
}

/// Progress of a chime in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChimeContext {
    /// Hour on a 12-hour dial (1-12)
    pub hour_number: u8,
    /// Bell strikes left, including the one playing
    pub bells_remaining: u8,
    /// Current phase
    pub phase: ChimePhase,
    /// Number plays left, including the one playing
    pub number_plays_remaining: u8,
    /// Volume to restore when the chime ends
    pub saved_volume: u8,
}

impl ChimeContext {
    /// Create a context for a chime at `hour_number`
    pub fn new(hour_number: u8, number_plays: u8, saved_volume: u8) -> Self {
        Self {
            hour_number,
            bells_remaining: hour_number,
            phase: ChimePhase::Bells,
            number_plays_remaining: number_plays.max(1),
            saved_volume,
        }
    }

    /// Advance after the current clip finished
    pub fn advance(&mut self) -> ChimeStep {
        match self.phase {
            ChimePhase::Bells => {
                self.bells_remaining = self.bells_remaining.saturating_sub(1);
                if self.bells_remaining > 0 {
                    ChimeStep::StrikeBell
                } else {
                    self.phase = ChimePhase::Number;
                    ChimeStep::SpeakNumber
                }
            }
            ChimePhase::Number => {
                self.number_plays_remaining = self.number_plays_remaining.saturating_sub(1);
                if self.number_plays_remaining > 0 {
                    ChimeStep::SpeakNumber
                } else {
                    ChimeStep::Complete
                }
            }
        }
    }

    /// Path of the spoken number clip (`<folder>/<n>.mp3`)
    ///
    /// Returns `None` if the path does not fit in a [`ClipPath`].
    pub fn number_path(&self, folder: &str) -> Option<ClipPath> {
        let mut path = ClipPath::new();
        let folder = folder.trim_end_matches('/');
        write!(path, "{}/{}.mp3", folder, self.hour_number).ok()?;
        Some(path)
    }
}

/// Decides when a chime is due
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChimeScheduler {
    config: ChimeConfig,
    /// Seconds after the top of the hour during which a chime may start
    window_s: u8,
    /// Hour of the last chime (None = none yet)
    last_chime_hour: Option<u8>,
}

impl ChimeScheduler {
    /// Create a new scheduler
    pub fn new(config: ChimeConfig, window_s: u8) -> Self {
        Self {
            config,
            window_s,
            last_chime_hour: None,
        }
    }

    /// Update the chime window
    pub fn set_window(&mut self, window_s: u8) {
        self.window_s = window_s;
    }

    /// Chime window in seconds
    pub fn window(&self) -> u8 {
        self.window_s
    }

    /// Hour of the last chime
    pub fn last_chime_hour(&self) -> Option<u8> {
        self.last_chime_hour
    }

    /// Check if a chime should start now
    ///
    /// Due when the hour is in range, this hour has not chimed, no chime is
    /// in progress, and the time is inside the window after the top of the
    /// hour. The window is half-open: minute 0 with `second` in
    /// `[0, window)`, so a window of 5 covers seconds 0 to 4 and a window
    /// of 0 never chimes.
    pub fn check_due(&self, time: &TimeOfDay, in_progress: bool) -> bool {
        !in_progress
            && self.config.covers(time.hour)
            && time.minute == 0
            && time.second < self.window_s
            && self.last_chime_hour != Some(time.hour)
    }

    /// Record that this hour has been dealt with without chiming
    pub fn mark_handled(&mut self, hour: u8) {
        self.last_chime_hour = Some(hour);
    }

    /// Start a chime for `time`, remembering the hour
    pub fn begin(&mut self, time: &TimeOfDay, saved_volume: u8) -> ChimeContext {
        self.last_chime_hour = Some(time.hour);
        ChimeContext::new(time.hour12(), self.config.number_plays, saved_volume)
    }
}
