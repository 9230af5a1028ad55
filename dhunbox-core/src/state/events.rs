//! Events reported by the playback state machine

use crate::scheduler::ResumeTarget;

/// Most events one pass of the main loop can report: motion, chime and
/// the state check each contribute at most one
pub const MAX_EVENTS_PER_POLL: usize = 3;

/// Events reported by one pass, in the order they happened
pub type Events = heapless::Vec<Event, MAX_EVENTS_PER_POLL>;

/// Something the state machine did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Motion session events
    /// Greeting clip started after motion
    GreetingStarted,
    /// Greeting refused (quiet hours or chime in progress)
    GreetingDeclined,
    /// Greeting clip could not be started
    GreetingFailed,
    /// Greeting finished and the first dhun track started
    SessionStarted,
    /// Greeting ended without an active session; back to idle
    SessionEnded,
    /// Next dhun track started
    TrackStarted,
    /// Dhun track could not be started
    TrackFailed,
    /// Dhun folder has no tracks; back to idle
    PlaylistEmpty,
    /// No motion for the session timeout; playback stopped
    SessionTimeout,

    // Chime events
    /// Chime started with the first bell strike
    ChimeStarted {
        /// Hour on a 12-hour dial
        hour_number: u8,
    },
    /// Chime due but suppressed by quiet hours
    ChimeDeclined {
        /// Hour (0-23)
        hour: u8,
    },
    /// Another bell strike started
    BellStruck,
    /// Spoken hour number started
    NumberSpoken,
    /// Chime finished normally
    ChimeCompleted {
        /// State playback was handed back to, if something was resumed
        resumed: Option<ResumeTarget>,
    },
    /// Chime clip failed; sequence abandoned
    ChimeAborted {
        /// State playback was handed back to, if something was resumed
        resumed: Option<ResumeTarget>,
    },

    // Recovery events
    /// Stale playing flag cleared while idle
    FlagsCleared,
    /// Start failures crossed the threshold; device restart requested
    RestartRequested,
}

impl Event {
    /// Check if this event belongs to the chime sequence
    pub fn is_chime_event(&self) -> bool {
        matches!(
            self,
            Event::ChimeStarted { .. }
                | Event::ChimeDeclined { .. }
                | Event::BellStruck
                | Event::NumberSpoken
                | Event::ChimeCompleted { .. }
                | Event::ChimeAborted { .. }
        )
    }

    /// Check if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::GreetingFailed
                | Event::TrackFailed
                | Event::ChimeAborted { .. }
                | Event::RestartRequested
        )
    }

    /// Check if this event ended with the appliance quiet
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            Event::SessionEnded | Event::PlaylistEmpty | Event::SessionTimeout
        )
    }
}
