//! Narrator error types.

use std::path::PathBuf;

/// Errors that can occur while building or playing a narration queue.
#[derive(Debug, thiserror::Error)]
pub enum NarratorError {
    /// The page document has no content root to narrate.
    #[error("Page has no content root")]
    MissingContentRoot,

    /// Audio asset could not be found on disk.
    #[error("Audio asset not found at {0}")]
    AssetNotFound(PathBuf),

    /// Audio asset exists but could not be decoded.
    #[error("Failed to decode audio asset {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// Failed to open the audio output stream.
    #[error("Failed to open audio output stream: {0}")]
    OutputStream(String),

    /// The audio output thread is gone.
    #[error("Audio output thread died")]
    AudioThreadDied,

    /// Playback speed must be a positive, finite factor.
    #[error("Invalid playback speed {0}")]
    InvalidSpeed(f32),

    /// IO error (page documents, translation files, settings).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
