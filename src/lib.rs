//! Page narrator: reads a page aloud one item at a time, highlighting the
//! item being narrated, with next/previous navigation, easy-read and image
//! description modes, and a persisted playback speed.

pub mod audio;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod narration;
pub mod view;

pub use error::NarratorError;
pub use narration::{NarrationEngine, NarrationEvent, PlaybackSnapshot};
