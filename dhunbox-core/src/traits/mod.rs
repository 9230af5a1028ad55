//! Collaborator traits
//!
//! These traits define the interface between the playback logic and the
//! engine, storage, clock and settings implementations it drives.

pub mod clock;
pub mod media;
pub mod platform;
pub mod settings;
pub mod storage;

pub use clock::{ClockError, TimeOfDay, WallClock};
pub use media::{MediaEngine, MAX_VOLUME, MIN_VOLUME};
pub use platform::Platform;
pub use settings::{SettingsError, SettingsStore};
pub use storage::{Storage, StorageError};
