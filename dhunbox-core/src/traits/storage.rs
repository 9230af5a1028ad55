//! Media storage trait

/// Errors from media storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Card not mounted or not responding
    NotReady,
    /// Path does not exist
    NotFound,
    /// Path exists but is not a directory
    NotADirectory,
    /// Low-level I/O failure
    Io,
}

/// Trait for the card holding the audio files
pub trait Storage {
    /// Check if a file or directory exists
    fn exists(&mut self, path: &str) -> bool;

    /// Delete a file
    fn remove(&mut self, path: &str) -> bool;

    /// Create a directory
    fn create_dir(&mut self, path: &str) -> bool;

    /// Enumerate the regular files directly inside `dir`
    ///
    /// `visit` receives each name as reported by the filesystem; this may
    /// be a bare file name or include the directory prefix.
    fn scan<F>(&mut self, dir: &str, visit: F) -> Result<(), StorageError>
    where
        F: FnMut(&str);

    /// Close and re-mount the card
    ///
    /// Used as a recovery step after the engine fails to open a file.
    /// Returns true if the card came back.
    fn reinit(&mut self) -> bool;
}
