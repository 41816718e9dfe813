//! Audio library scanning and track lookup.
//!
//! The library is populated once at startup by scanning a directory tree
//! for audio files. Tracks are addressed by a stable id derived from the
//! file path, so ids survive restarts as long as files do not move.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::streaming::content_type_for_path;

/// Errors that can occur during library operations.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Invalid track id: {value}")]
    InvalidTrackId { value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stable identifier for a track, derived from its file path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(u64);

impl TrackId {
    /// Derives a deterministic id from a file path.
    pub fn from_path(path: &Path) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Parses the 16-digit hex form used in URLs.
    ///
    /// # Errors
    /// - `LibraryError::InvalidTrackId` - Value is not 16 hex digits
    pub fn from_hex(value: &str) -> Result<Self, LibraryError> {
        if value.len() != 16 {
            return Err(LibraryError::InvalidTrackId {
                value: value.to_string(),
            });
        }
        u64::from_str_radix(value, 16)
            .map(Self)
            .map_err(|_| LibraryError::InvalidTrackId {
                value: value.to_string(),
            })
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A single audio file known to the library.
#[derive(Debug, Clone)]
pub struct AudioTrack {
    /// Stable id used in URLs
    pub track_id: TrackId,
    /// Absolute or library-relative path to the audio file
    pub file_path: PathBuf,
    /// File size in bytes at scan time
    pub size: u64,
    /// Title extracted from the filename
    pub title: String,
    /// MIME type resolved from the file extension
    pub content_type: &'static str,
}

/// In-memory index of audio files found under the library root.
#[derive(Debug, Default)]
pub struct AudioLibrary {
    tracks: HashMap<TrackId, AudioTrack>,
}

impl AudioLibrary {
    pub fn new() -> Self {
        Self {
            tracks: HashMap::new(),
        }
    }

    /// Scans a directory tree for audio files and indexes them.
    ///
    /// Returns the number of tracks added. Subdirectories are scanned
    /// recursively; unreadable subdirectories are logged and skipped.
    ///
    /// # Errors
    /// - `LibraryError::Io` - The root directory cannot be read
    pub async fn scan_directory(&mut self, dir: &Path) -> Result<usize, LibraryError> {
        let count = self.scan_directory_recursive(dir).await?;
        tracing::info!("Indexed {} audio files under {}", count, dir.display());
        Ok(count)
    }

    fn scan_directory_recursive<'a>(
        &'a mut self,
        dir: &'a Path,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<usize, std::io::Error>> + Send + 'a>,
    > {
        Box::pin(async move {
            let mut count = 0;
            let mut entries = tokio::fs::read_dir(dir).await?;

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();

                if path.is_dir() {
                    if let Some(dir_name) = path.file_name().and_then(|n| n.to_str())
                        && dir_name.starts_with('.')
                    {
                        continue;
                    }

                    match self.scan_directory_recursive(&path).await {
                        Ok(subcount) => count += subcount,
                        Err(e) => {
                            tracing::warn!("Failed to scan {}: {}", path.display(), e);
                        }
                    }
                } else if path.is_file()
                    && is_audio_file(&path)
                    && let Ok(metadata) = entry.metadata().await
                {
                    let track = track_from_file(path, metadata.len());
                    self.tracks.insert(track.track_id, track);
                    count += 1;
                }
            }

            Ok(count)
        })
    }

    /// Looks up a track by id.
    pub fn track(&self, track_id: TrackId) -> Option<&AudioTrack> {
        self.tracks.get(&track_id)
    }

    /// Returns all tracks, ordered by title for stable listings.
    pub fn all_tracks(&self) -> Vec<&AudioTrack> {
        let mut tracks: Vec<&AudioTrack> = self.tracks.values().collect();
        tracks.sort_by(|a, b| a.title.cmp(&b.title).then(a.track_id.cmp(&b.track_id)));
        tracks
    }

    /// Total size in bytes of all indexed tracks.
    pub fn total_bytes(&self) -> u64 {
        self.tracks.values().map(|t| t.size).sum()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Extensions indexed by the library scanner.
fn is_audio_file(path: &Path) -> bool {
    let Some(extension) = path.extension() else {
        return false;
    };
    let ext = extension.to_string_lossy().to_lowercase();
    matches!(ext.as_str(), "ogg" | "oga" | "m4a" | "mp3" | "wav" | "flac")
}

fn track_from_file(path: PathBuf, size: u64) -> AudioTrack {
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled")
        .replace(['.', '_'], " ");

    AudioTrack {
        track_id: TrackId::from_path(&path),
        content_type: content_type_for_path(&path),
        file_path: path,
        size,
        title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_file(path: &Path, len: usize) {
        tokio::fs::write(path, vec![0u8; len]).await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_indexes_audio_files_only() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("morning_calm.ogg"), 128).await;
        write_file(&dir.path().join("evening.breath.mp3"), 256).await;
        write_file(&dir.path().join("notes.txt"), 64).await;

        let mut library = AudioLibrary::new();
        let count = library.scan_directory(dir.path()).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(library.len(), 2);
        assert_eq!(library.total_bytes(), 384);

        let titles: Vec<&str> = library
            .all_tracks()
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["evening breath", "morning calm"]);
    }

    #[tokio::test]
    async fn test_scan_recurses_and_skips_hidden_directories() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("sessions"))
            .await
            .unwrap();
        tokio::fs::create_dir(dir.path().join(".cache")).await.unwrap();
        write_file(&dir.path().join("sessions").join("body_scan.flac"), 32).await;
        write_file(&dir.path().join(".cache").join("ignored.ogg"), 32).await;

        let mut library = AudioLibrary::new();
        let count = library.scan_directory(dir.path()).await.unwrap();

        assert_eq!(count, 1);
        let track = library.all_tracks()[0];
        assert_eq!(track.title, "body scan");
        assert_eq!(track.content_type, "audio/flac");
    }

    #[tokio::test]
    async fn test_scan_missing_root_is_an_error() {
        let mut library = AudioLibrary::new();
        let result = library.scan_directory(Path::new("/no/such/dir")).await;
        assert!(matches!(result, Err(LibraryError::Io(_))));
    }

    #[test]
    fn test_track_id_hex_round_trip() {
        let id = TrackId::from_path(Path::new("/library/morning_calm.ogg"));
        let parsed = TrackId::from_hex(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_track_id_rejects_malformed_hex() {
        assert!(TrackId::from_hex("xyz").is_err());
        assert!(TrackId::from_hex("00ff").is_err()); // too short
        assert!(TrackId::from_hex("zzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn test_track_id_is_deterministic() {
        let a = TrackId::from_path(Path::new("/library/a.ogg"));
        let b = TrackId::from_path(Path::new("/library/a.ogg"));
        let c = TrackId::from_path(Path::new("/library/c.ogg"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
