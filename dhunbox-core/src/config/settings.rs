//! Persisted settings
//!
//! Do-not-disturb window, output volume and generic keyed integers. The
//! whole set is stored as a single record with a magic/version/CRC header.

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::behavior::DEFAULT_VOLUME;
use crate::traits::{MAX_VOLUME, MIN_VOLUME};

/// Magic number to identify a valid settings record
pub const SETTINGS_MAGIC: u32 = 0x44484E42; // "DHNB"

/// Current settings record version
pub const SETTINGS_VERSION: u8 = 1;

/// Maximum number of generic keyed integers
pub const MAX_INT_KEYS: usize = 8;

/// Maximum key length for generic keyed integers
pub const MAX_KEY_LEN: usize = 15;

/// Largest allowed chime window in seconds
pub const MAX_CHIME_WINDOW_S: u8 = 60;

/// Errors from validating settings values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsValueError {
    /// Hour outside 0-23
    InvalidHour,
    /// Chime window outside 1-60 seconds
    InvalidWindow,
}

/// Do-not-disturb and chime window settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DndSettings {
    /// Whether the quiet window is active
    pub enabled: bool,
    /// First quiet hour (0-23)
    pub start_hour: u8,
    /// First hour after the quiet window (0-23)
    pub end_hour: u8,
    /// Seconds after the top of the hour during which a chime may fire
    pub chime_window_s: u8,
}

impl Default for DndSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            start_hour: 22,
            end_hour: 6,
            chime_window_s: 5,
        }
    }
}

impl DndSettings {
    /// Check that all values are within range
    pub fn validate(&self) -> Result<(), SettingsValueError> {
        validate_hour(self.start_hour)?;
        validate_hour(self.end_hour)?;
        validate_window(self.chime_window_s)
    }
}

/// Check an hour value (0-23)
pub fn validate_hour(hour: u8) -> Result<(), SettingsValueError> {
    if hour < 24 {
        Ok(())
    } else {
        Err(SettingsValueError::InvalidHour)
    }
}

/// Check a chime window value (1-60 seconds)
pub fn validate_window(window_s: u8) -> Result<(), SettingsValueError> {
    if (1..=MAX_CHIME_WINDOW_S).contains(&window_s) {
        Ok(())
    } else {
        Err(SettingsValueError::InvalidWindow)
    }
}

/// Clamp a volume to the engine range
pub fn clamp_volume(volume: u8) -> u8 {
    volume.clamp(MIN_VOLUME, MAX_VOLUME)
}

/// A generic keyed integer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntEntry {
    /// Key name
    pub key: String<MAX_KEY_LEN>,
    /// Stored value
    pub value: i32,
}

/// Complete settings record stored in non-volatile memory
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SettingsRecord {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Saved output volume (None = never saved)
    pub volume: Option<u8>,
    /// Saved DND settings (None = never saved)
    pub dnd: Option<DndSettings>,
    /// Generic keyed integers
    pub ints: Vec<IntEntry, MAX_INT_KEYS>,
    /// CRC32 checksum (calculated over magic..ints)
    pub crc: u32,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsRecord {
    /// Create an empty record
    pub const fn new() -> Self {
        Self {
            magic: SETTINGS_MAGIC,
            version: SETTINGS_VERSION,
            volume: None,
            dnd: None,
            ints: Vec::new(),
            crc: 0,
        }
    }

    /// Check if the header is valid (magic and version match)
    pub fn is_valid(&self) -> bool {
        self.magic == SETTINGS_MAGIC && self.version == SETTINGS_VERSION
    }

    /// Saved volume, or the default
    pub fn volume_or(&self, default: u8) -> u8 {
        self.volume.map(clamp_volume).unwrap_or(default)
    }

    /// Saved volume, or [`DEFAULT_VOLUME`]
    pub fn volume(&self) -> u8 {
        self.volume_or(DEFAULT_VOLUME)
    }

    /// Saved DND settings, or defaults when absent or out of range
    pub fn dnd(&self) -> DndSettings {
        match self.dnd {
            Some(dnd) if dnd.validate().is_ok() => dnd,
            _ => DndSettings::default(),
        }
    }

    /// Look up a keyed integer
    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.ints
            .iter()
            .find(|e| e.key.as_str() == key)
            .map(|e| e.value)
    }

    /// Set a keyed integer
    ///
    /// Replaces an existing entry or takes a free slot.
    pub fn set_int(&mut self, key: &str, value: i32) -> Result<(), IntSlotError> {
        if let Some(entry) = self.ints.iter_mut().find(|e| e.key.as_str() == key) {
            entry.value = value;
            return Ok(());
        }

        let mut name: String<MAX_KEY_LEN> = String::new();
        name.push_str(key).map_err(|_| IntSlotError::KeyTooLong)?;

        self.ints
            .push(IntEntry { key: name, value })
            .map_err(|_| IntSlotError::Full)
    }

    /// Remove a keyed integer
    pub fn remove_int(&mut self, key: &str) {
        self.ints.retain(|e| e.key.as_str() != key);
    }

    /// Calculate CRC32 for the data (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFFFFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);

        match self.volume {
            Some(v) => crc = crc32_update(crc, &[1, v]),
            None => crc = crc32_update(crc, &[0]),
        }

        match self.dnd {
            Some(d) => {
                crc = crc32_update(
                    crc,
                    &[1, d.enabled as u8, d.start_hour, d.end_hour, d.chime_window_s],
                );
            }
            None => crc = crc32_update(crc, &[0]),
        }

        for entry in &self.ints {
            crc = crc32_update(crc, &[entry.key.len() as u8]);
            crc = crc32_update(crc, entry.key.as_bytes());
            crc = crc32_update(crc, &entry.value.to_le_bytes());
        }

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

/// Errors from storing a keyed integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntSlotError {
    /// All slots are taken
    Full,
    /// Key longer than [`MAX_KEY_LEN`]
    KeyTooLong,
}

/// CRC32 update (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_default() {
        let record = SettingsRecord::default();
        assert!(record.is_valid());
        assert_eq!(record.volume(), DEFAULT_VOLUME);
        assert_eq!(record.dnd(), DndSettings::default());
    }

    #[test]
    fn test_dnd_defaults() {
        let dnd = DndSettings::default();
        assert!(dnd.enabled);
        assert_eq!(dnd.start_hour, 22);
        assert_eq!(dnd.end_hour, 6);
        assert_eq!(dnd.chime_window_s, 5);
        assert!(dnd.validate().is_ok());
    }

    #[test]
    fn test_dnd_validation() {
        let mut dnd = DndSettings::default();
        dnd.start_hour = 24;
        assert_eq!(dnd.validate(), Err(SettingsValueError::InvalidHour));

        let mut dnd = DndSettings::default();
        dnd.chime_window_s = 0;
        assert_eq!(dnd.validate(), Err(SettingsValueError::InvalidWindow));

        dnd.chime_window_s = 61;
        assert_eq!(dnd.validate(), Err(SettingsValueError::InvalidWindow));

        dnd.chime_window_s = 60;
        assert!(dnd.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_dnd_falls_back() {
        let mut record = SettingsRecord::new();
        record.dnd = Some(DndSettings {
            enabled: false,
            start_hour: 30,
            end_hour: 6,
            chime_window_s: 5,
        });
        assert_eq!(record.dnd(), DndSettings::default());
    }

    #[test]
    fn test_volume_clamped() {
        let mut record = SettingsRecord::new();
        record.volume = Some(40);
        assert_eq!(record.volume(), MAX_VOLUME);

        assert_eq!(clamp_volume(MIN_VOLUME), MIN_VOLUME);
        assert_eq!(clamp_volume(MAX_VOLUME + 1), MAX_VOLUME);
    }

    #[test]
    fn test_set_and_get_int() {
        let mut record = SettingsRecord::new();
        assert_eq!(record.get_int("eq_bass"), None);

        record.set_int("eq_bass", -3).unwrap();
        assert_eq!(record.get_int("eq_bass"), Some(-3));

        // Overwrite keeps a single entry
        record.set_int("eq_bass", 4).unwrap();
        assert_eq!(record.get_int("eq_bass"), Some(4));
        assert_eq!(record.ints.len(), 1);

        record.remove_int("eq_bass");
        assert_eq!(record.get_int("eq_bass"), None);
    }

    #[test]
    fn test_int_slots_full() {
        let mut record = SettingsRecord::new();
        let keys = ["a", "b", "c", "d", "e", "f", "g", "h"];
        for (i, key) in keys.iter().enumerate() {
            record.set_int(key, i as i32).unwrap();
        }
        assert_eq!(record.set_int("i", 9), Err(IntSlotError::Full));
    }

    #[test]
    fn test_int_key_too_long() {
        let mut record = SettingsRecord::new();
        assert_eq!(
            record.set_int("a_key_that_is_far_too_long", 1),
            Err(IntSlotError::KeyTooLong)
        );
    }

    #[test]
    fn test_crc_consistency() {
        let mut record = SettingsRecord::new();
        record.volume = Some(14);
        record.dnd = Some(DndSettings::default());
        record.set_int("eq_mid", 2).unwrap();
        record.update_crc();

        assert!(record.verify_crc());

        // Modify data without updating CRC
        record.volume = Some(15);
        assert!(!record.verify_crc());
    }
}
