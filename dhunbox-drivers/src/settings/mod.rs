//! Persistent settings

pub mod store;

pub use store::{MemoryBackend, RecordBackend, RecordError, RecordSettings, MAX_RECORD_SIZE};
