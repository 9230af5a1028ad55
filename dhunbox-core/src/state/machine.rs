//! Playback state definition

use crate::scheduler::{ChimeContext, ResumeTarget};

/// What the appliance is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackState {
    /// Nothing scheduled; waiting for motion or the next chime
    Idle,
    /// Greeting clip playing at the start of a motion session
    Greeting,
    /// Dhun playlist looping
    Dhun,
    /// Hourly chime in progress
    Chiming(ChimeContext),
}

impl PlaybackState {
    /// Check if this is the idle state
    pub fn is_idle(&self) -> bool {
        matches!(self, PlaybackState::Idle)
    }

    /// Check if a chime is in progress
    pub fn is_chiming(&self) -> bool {
        matches!(self, PlaybackState::Chiming(_))
    }

    /// Check if a motion session is active
    pub fn in_session(&self) -> bool {
        matches!(self, PlaybackState::Greeting | PlaybackState::Dhun)
    }

    /// Chime progress, if chiming
    pub fn chime(&self) -> Option<&ChimeContext> {
        match self {
            PlaybackState::Chiming(ctx) => Some(ctx),
            _ => None,
        }
    }

    /// State a chime should hand back to if it interrupts this one
    pub fn resume_target(&self) -> Option<ResumeTarget> {
        match self {
            PlaybackState::Idle => Some(ResumeTarget::Idle),
            PlaybackState::Greeting => Some(ResumeTarget::Greeting),
            PlaybackState::Dhun => Some(ResumeTarget::Dhun),
            PlaybackState::Chiming(_) => None,
        }
    }

    /// Short name for status reporting
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Greeting => "greeting",
            PlaybackState::Dhun => "dhun",
            PlaybackState::Chiming(_) => "chime",
        }
    }
}

impl From<ResumeTarget> for PlaybackState {
    fn from(target: ResumeTarget) -> Self {
        match target {
            ResumeTarget::Idle => PlaybackState::Idle,
            ResumeTarget::Greeting => PlaybackState::Greeting,
            ResumeTarget::Dhun => PlaybackState::Dhun,
        }
    }
}
