//! Dhun playlist
//!
//! Flat list of playable files in a single folder on the card.

use heapless::Vec;

use crate::config::{ClipPath, MAX_TRACKS};
use crate::traits::Storage;

/// Tracks found in one folder
#[derive(Debug, Clone)]
pub struct Playlist {
    folder: &'static str,
    tracks: Vec<ClipPath, MAX_TRACKS>,
}

/// One page of a track listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    /// Tracks on this page
    pub tracks: &'a [ClipPath],
    /// Index of the first track on this page
    pub start: usize,
    /// Tracks in the whole playlist
    pub total: usize,
}

impl Playlist {
    /// Create an empty playlist for `folder`
    pub const fn new(folder: &'static str) -> Self {
        Self {
            folder,
            tracks: Vec::new(),
        }
    }

    /// Folder this playlist covers
    pub fn folder(&self) -> &'static str {
        self.folder
    }

    /// Re-read the folder
    ///
    /// Creates the folder when it is missing. Only `.mp3` files are kept and
    /// the list is capped at [`MAX_TRACKS`]. Returns the number of tracks.
    pub fn rescan<S: Storage>(&mut self, storage: &mut S) -> usize {
        self.tracks.clear();

        if !storage.exists(self.folder) {
            info!("{=str} missing, creating", self.folder);
            if !storage.create_dir(self.folder) {
                warn!("could not create {=str}", self.folder);
            }
        }

        let folder = self.folder;
        let tracks = &mut self.tracks;
        let result = storage.scan(folder, |name| {
            if !is_playable(name) {
                return;
            }
            let Some(path) = normalize(folder, name) else {
                warn!("path too long, skipping {=str}", name);
                return;
            };
            if tracks.push(path).is_err() {
                warn!("playlist full, skipping {=str}", name);
            }
        });

        if let Err(e) = result {
            warn!("scan of {=str} failed: {}", folder, e);
        }

        info!("scan finished, {} tracks", self.tracks.len());
        self.tracks.len()
    }

    /// Number of tracks
    pub fn count(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the playlist is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at `index`
    pub fn path_at(&self, index: usize) -> Option<&str> {
        self.tracks.get(index).map(|p| p.as_str())
    }

    /// A window of the listing starting at `start`
    pub fn page(&self, start: usize, count: usize) -> Page<'_> {
        let total = self.tracks.len();
        let from = start.min(total);
        let to = from.saturating_add(count).min(total);
        Page {
            tracks: &self.tracks[from..to],
            start: from,
            total,
        }
    }
}

/// Check for an `.mp3` extension (any case)
fn is_playable(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 4 && bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".mp3")
}

/// Build `/<folder>/<file>` from a scanned name
///
/// Names may arrive bare, with a leading slash, or prefixed with the
/// folder name itself.
fn normalize(folder: &str, name: &str) -> Option<ClipPath> {
    let dir = folder.trim_matches('/');
    let mut file = name.trim_start_matches('/');

    if let Some((first, rest)) = file.split_once('/') {
        if first.eq_ignore_ascii_case(dir) {
            file = rest;
        }
    }

    let mut path = ClipPath::new();
    path.push('/').ok()?;
    if !dir.is_empty() {
        path.push_str(dir).ok()?;
        path.push('/').ok()?;
    }
    path.push_str(file).ok()?;
    Some(path)
}
