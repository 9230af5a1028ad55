//! Settings persistence trait

use crate::config::DndSettings;

/// Errors from settings persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Backing store rejected the write
    Storage,
    /// Value could not be encoded
    Encode,
    /// No free slot for another keyed value
    Full,
    /// Key longer than the supported maximum
    KeyTooLong,
}

/// Trait for persisted appliance settings
///
/// Implementations read and write non-volatile storage. Every save is
/// expected to be durable when it returns.
pub trait SettingsStore {
    /// Load do-not-disturb settings, falling back to defaults
    fn load_dnd(&mut self) -> DndSettings;

    /// Persist do-not-disturb settings
    fn save_dnd(&mut self, settings: &DndSettings) -> Result<(), SettingsError>;

    /// Load the stored output volume, or `default` if none was saved
    fn load_volume(&mut self, default: u8) -> u8;

    /// Persist the output volume
    fn save_volume(&mut self, volume: u8) -> Result<(), SettingsError>;

    /// Load a generic keyed integer, or `default` if absent
    fn load_int(&mut self, key: &str, default: i32) -> i32;

    /// Persist a generic keyed integer
    fn save_int(&mut self, key: &str, value: i32) -> Result<(), SettingsError>;
}
