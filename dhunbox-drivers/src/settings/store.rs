//! Settings record persistence
//!
//! All settings live in one [`SettingsRecord`] serialized with postcard.
//! Each save rewrites the whole record with a fresh CRC. On load, a
//! record with a bad header or CRC is discarded and defaults are used.

use dhunbox_core::config::{clamp_volume, DndSettings, IntSlotError, SettingsRecord};
use dhunbox_core::traits::{SettingsError, SettingsStore};

/// Largest encoded record
pub const MAX_RECORD_SIZE: usize = 256;

/// Record backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Nothing stored yet
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Underlying storage failed
    Storage,
}

/// Non-volatile slot holding one encoded record
pub trait RecordBackend {
    /// Read the stored bytes into `buffer`, returning the length
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, RecordError>;

    /// Replace the stored bytes
    fn write(&mut self, data: &[u8]) -> Result<(), RecordError>;
}

/// RAM-backed record slot
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: Option<heapless::Vec<u8, MAX_RECORD_SIZE>>,
    /// Writes performed
    pub writes: u32,
}

impl MemoryBackend {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bytes, if any
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Overwrite the stored bytes directly
    pub fn set_data(&mut self, data: &[u8]) -> Result<(), RecordError> {
        let bytes = heapless::Vec::from_slice(data).map_err(|_| RecordError::BufferTooSmall)?;
        self.data = Some(bytes);
        Ok(())
    }
}

impl RecordBackend for MemoryBackend {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, RecordError> {
        let data = self.data.as_ref().ok_or(RecordError::NotFound)?;
        let target = buffer
            .get_mut(..data.len())
            .ok_or(RecordError::BufferTooSmall)?;
        target.copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), RecordError> {
        self.set_data(data)?;
        self.writes += 1;
        Ok(())
    }
}

/// Settings store over a record backend
pub struct RecordSettings<B> {
    backend: B,
    record: SettingsRecord,
}

impl<B: RecordBackend> RecordSettings<B> {
    /// Open the store, loading the current record
    pub fn open(mut backend: B) -> Self {
        let record = Self::load(&mut backend).unwrap_or_default();
        Self { backend, record }
    }

    fn load(backend: &mut B) -> Option<SettingsRecord> {
        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let len = match backend.read(&mut buffer) {
            Ok(len) => len,
            Err(RecordError::NotFound) => {
                info!("no stored settings, using defaults");
                return None;
            }
            Err(e) => {
                warn!("settings read failed: {}", e);
                return None;
            }
        };

        let Some(bytes) = buffer.get(..len) else {
            warn!("settings read reported {} bytes, more than fit", len);
            return None;
        };

        let record: SettingsRecord = match postcard::from_bytes(bytes) {
            Ok(record) => record,
            Err(_) => {
                warn!("stored settings undecodable, using defaults");
                return None;
            }
        };

        if !record.is_valid() || !record.verify_crc() {
            warn!("stored settings failed validation, using defaults");
            return None;
        }

        debug!("loaded {} bytes of settings", len);
        Some(record)
    }

    fn persist(&mut self) -> Result<(), SettingsError> {
        self.record.update_crc();

        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let encoded =
            postcard::to_slice(&self.record, &mut buffer).map_err(|_| SettingsError::Encode)?;
        self.backend.write(encoded).map_err(|e| {
            warn!("settings write failed: {}", e);
            SettingsError::Storage
        })
    }

    /// Current record
    pub fn record(&self) -> &SettingsRecord {
        &self.record
    }

    /// Backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Take back the backend
    pub fn into_backend(self) -> B {
        self.backend
    }
}

impl<B: RecordBackend> SettingsStore for RecordSettings<B> {
    fn load_dnd(&mut self) -> DndSettings {
        self.record.dnd()
    }

    fn save_dnd(&mut self, settings: &DndSettings) -> Result<(), SettingsError> {
        self.record.dnd = Some(*settings);
        self.persist()
    }

    fn load_volume(&mut self, default: u8) -> u8 {
        self.record.volume_or(default)
    }

    fn save_volume(&mut self, volume: u8) -> Result<(), SettingsError> {
        self.record.volume = Some(clamp_volume(volume));
        self.persist()
    }

    fn load_int(&mut self, key: &str, default: i32) -> i32 {
        self.record.get_int(key).unwrap_or(default)
    }

    fn save_int(&mut self, key: &str, value: i32) -> Result<(), SettingsError> {
        self.record.set_int(key, value).map_err(|e| match e {
            IntSlotError::Full => SettingsError::Full,
            IntSlotError::KeyTooLong => SettingsError::KeyTooLong,
        })?;
        self.persist()
    }
}
