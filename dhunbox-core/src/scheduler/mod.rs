//! Time-based playback policy
//!
//! Decides from the wall clock when playback is suppressed and when an
//! hourly chime is due, and steps the chime's bell/number sequence.

pub mod chime;
pub mod dnd;

pub use chime::{ChimeContext, ChimePhase, ChimeScheduler, ChimeStep, Preemption, ResumeTarget};
pub use dnd::DndWindow;
