//! MIME type resolution for audio files.

use std::path::Path;

/// Content type served when the extension is missing or unrecognized.
pub const DEFAULT_CONTENT_TYPE: &str = "audio/ogg";

/// Determines the MIME type for an audio file from its extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
