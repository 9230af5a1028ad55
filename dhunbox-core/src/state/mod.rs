//! Playback state
//!
//! The current activity of the appliance and the events reported when it
//! changes.

pub mod events;
pub mod machine;

pub use events::{Event, Events, MAX_EVENTS_PER_POLL};
pub use machine::PlaybackState;
