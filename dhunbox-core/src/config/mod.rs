//! Configuration types
//!
//! Behavior constants compiled into the firmware plus the user-adjustable
//! settings that are persisted through a [`SettingsStore`](crate::traits::SettingsStore).

pub mod behavior;
pub mod settings;

pub use behavior::*;
pub use settings::*;
