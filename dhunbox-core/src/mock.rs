//! Mock collaborators for host tests

use std::string::{String, ToString};
use std::vec::Vec;

use crate::config::{DndSettings, SettingsRecord};
use crate::traits::{
    ClockError, MediaEngine, Platform, SettingsError, SettingsStore, Storage, StorageError,
    TimeOfDay, WallClock,
};

/// Engine that records every connect and can be told to reject them
pub struct MockEngine {
    pub running: bool,
    pub volume: u8,
    /// Reject every connect
    pub reject_all: bool,
    /// Reject this many upcoming connects
    pub reject_next: u32,
    /// Service calls needed before a stop takes effect
    pub stop_lag: u32,
    pending_stop: Option<u32>,
    pub connects: Vec<String>,
    pub connect_volumes: Vec<u8>,
    pub stops: u32,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            running: false,
            volume: 11,
            reject_all: false,
            reject_next: 0,
            stop_lag: 0,
            pending_stop: None,
            connects: Vec::new(),
            connect_volumes: Vec::new(),
            stops: 0,
        }
    }

    /// Simulate the current track reaching its end
    pub fn finish(&mut self) {
        self.running = false;
        self.pending_stop = None;
    }

    pub fn last_connect(&self) -> Option<&str> {
        self.connects.last().map(|s| s.as_str())
    }
}

impl MediaEngine for MockEngine {
    fn connect(&mut self, path: &str) -> bool {
        self.connects.push(path.to_string());
        self.connect_volumes.push(self.volume);
        if self.reject_all {
            return false;
        }
        if self.reject_next > 0 {
            self.reject_next -= 1;
            return false;
        }
        self.running = true;
        self.pending_stop = None;
        true
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn stop(&mut self) {
        self.stops += 1;
        if !self.running {
            return;
        }
        if self.stop_lag == 0 {
            self.running = false;
        } else {
            self.pending_stop = Some(self.stop_lag);
        }
    }

    fn set_volume(&mut self, volume: u8) {
        self.volume = volume;
    }

    fn volume(&self) -> u8 {
        self.volume
    }

    fn service(&mut self) {
        if let Some(remaining) = self.pending_stop {
            if remaining <= 1 {
                self.running = false;
                self.pending_stop = None;
            } else {
                self.pending_stop = Some(remaining - 1);
            }
        }
    }
}

/// In-memory card with a flat list of files
pub struct MockStorage {
    pub files: Vec<String>,
    pub dirs: Vec<String>,
    pub reinits: u32,
    /// Report names with the directory prefix, as some filesystems do
    pub prefixed_names: bool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            dirs: Vec::new(),
            reinits: 0,
            prefixed_names: false,
        }
    }

    pub fn with_files(files: &[&str]) -> Self {
        let mut storage = Self::new();
        for file in files {
            storage.add(file);
        }
        storage
    }

    pub fn add(&mut self, path: &str) {
        if let Some(idx) = path.rfind('/') {
            let dir = if idx == 0 { "/" } else { &path[..idx] };
            if !self.dirs.iter().any(|d| d == dir) {
                self.dirs.push(dir.to_string());
            }
        }
        self.files.push(path.to_string());
    }
}

impl Storage for MockStorage {
    fn exists(&mut self, path: &str) -> bool {
        self.files.iter().any(|f| f == path) || self.dirs.iter().any(|d| d == path)
    }

    fn remove(&mut self, path: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f != path);
        self.files.len() != before
    }

    fn create_dir(&mut self, path: &str) -> bool {
        if !self.dirs.iter().any(|d| d == path) {
            self.dirs.push(path.to_string());
        }
        true
    }

    fn scan<F>(&mut self, dir: &str, mut visit: F) -> Result<(), StorageError>
    where
        F: FnMut(&str),
    {
        if !self.dirs.iter().any(|d| d == dir) {
            return Err(StorageError::NotFound);
        }
        let prefix = if dir.ends_with('/') {
            dir.to_string()
        } else {
            std::format!("{}/", dir)
        };
        for file in &self.files {
            if let Some(name) = file.strip_prefix(prefix.as_str()) {
                if name.contains('/') {
                    continue;
                }
                if self.prefixed_names {
                    visit(&file[1..]);
                } else {
                    visit(name);
                }
            }
        }
        Ok(())
    }

    fn reinit(&mut self) -> bool {
        self.reinits += 1;
        true
    }
}

/// Clock returning a settable time
pub struct MockClock {
    pub time: Result<TimeOfDay, ClockError>,
}

impl MockClock {
    pub fn at(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            time: Ok(TimeOfDay::new(hour, minute, second)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            time: Err(ClockError::Unavailable),
        }
    }

    pub fn set(&mut self, hour: u8, minute: u8, second: u8) {
        self.time = Ok(TimeOfDay::new(hour, minute, second));
    }
}

impl WallClock for MockClock {
    fn now(&mut self) -> Result<TimeOfDay, ClockError> {
        self.time
    }
}

/// Settings kept in a record, counting saves
pub struct MockSettings {
    pub record: SettingsRecord,
    pub saves: u32,
}

impl MockSettings {
    pub fn new() -> Self {
        Self {
            record: SettingsRecord::new(),
            saves: 0,
        }
    }

    pub fn with_dnd(dnd: DndSettings) -> Self {
        let mut settings = Self::new();
        settings.record.dnd = Some(dnd);
        settings
    }
}

impl SettingsStore for MockSettings {
    fn load_dnd(&mut self) -> DndSettings {
        self.record.dnd()
    }

    fn save_dnd(&mut self, settings: &DndSettings) -> Result<(), SettingsError> {
        self.record.dnd = Some(*settings);
        self.saves += 1;
        Ok(())
    }

    fn load_volume(&mut self, default: u8) -> u8 {
        self.record.volume_or(default)
    }

    fn save_volume(&mut self, volume: u8) -> Result<(), SettingsError> {
        self.record.volume = Some(volume);
        self.saves += 1;
        Ok(())
    }

    fn load_int(&mut self, key: &str, default: i32) -> i32 {
        self.record.get_int(key).unwrap_or(default)
    }

    fn save_int(&mut self, key: &str, value: i32) -> Result<(), SettingsError> {
        self.record
            .set_int(key, value)
            .map_err(|_| SettingsError::Full)?;
        self.saves += 1;
        Ok(())
    }
}

/// Platform whose clock only moves when delayed or advanced
pub struct MockPlatform {
    pub now: u32,
    pub delayed_ms: u32,
    pub yields: u32,
    pub restarts: u32,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            now: 10_000,
            delayed_ms: 0,
            yields: 0,
            restarts: 0,
        }
    }

    pub fn advance(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
    }
}

impl Platform for MockPlatform {
    fn now_ms(&self) -> u32 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delayed_ms += ms;
        self.now = self.now.wrapping_add(ms);
    }

    fn yield_now(&mut self) {
        self.yields += 1;
    }

    fn restart(&mut self) {
        self.restarts += 1;
    }
}
