//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (display items, UI state)
//! - `playback`: Playback information handed to the view
//! - `content`: Page content tree loaded from disk
//! - `assets`: Per-language text and audio asset map
//! - `settings`: Persisted speed preference
//! - `app_model`: Main application model with state management methods

mod types;
mod playback;
mod content;
mod assets;
mod settings;
mod app_model;

pub use types::{DisplayItem, UiState};

pub use playback::{PlaybackInfo, describe_event};

pub use content::{Page, PageNode};

pub use assets::{AssetMap, TranslationFile};

pub use settings::{JsonSettingsStore, StoredSettings};

pub use app_model::{AppModel, ContentState, PageContent};
