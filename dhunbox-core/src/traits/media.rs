//! Audio engine trait

/// Lowest engine volume
pub const MIN_VOLUME: u8 = 0;

/// Highest engine volume
pub const MAX_VOLUME: u8 = 21;

/// Trait for the MP3 decode / I2S output engine
///
/// The engine plays one file at a time. Volume is engine-global and is
/// not reset when a new file starts.
pub trait MediaEngine {
    /// Begin playback of a file on storage
    ///
    /// This is the raw connect primitive; it may block briefly while the
    /// file header is read. Retries and recovery live in
    /// [`MediaStarter`](crate::media::MediaStarter).
    fn connect(&mut self, path: &str) -> bool;

    /// Check whether the engine is currently producing audio
    fn is_running(&self) -> bool;

    /// Request playback to stop
    ///
    /// The engine may keep reporting running for a short while afterwards.
    fn stop(&mut self);

    /// Set output volume (0..=21)
    fn set_volume(&mut self, volume: u8);

    /// Get output volume
    fn volume(&self) -> u8;

    /// Advance internal decoding and buffering
    ///
    /// Must be called every control-loop iteration.
    fn service(&mut self);
}
