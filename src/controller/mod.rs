//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and the narration engine.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Narration control, modes and speed
//! - `narration_events`: Narration event listener feeding the status line

mod input;
mod playback;
mod narration_events;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::NarratorError;
use crate::model::AppModel;
use crate::narration::NarrationEngine;

pub use playback::{SPEED_PRESETS, faster_preset, slower_preset};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) engine: NarrationEngine,
    event_listener_started: Arc<Mutex<bool>>,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, engine: NarrationEngine) -> Self {
        Self {
            model,
            engine,
            event_listener_started: Arc::new(Mutex::new(false)),
        }
    }

    pub fn engine(&self) -> &NarrationEngine {
        &self.engine
    }

    /// Start the narration event listener once
    pub async fn try_start_event_listener(&self) {
        let mut started = self.event_listener_started.lock().await;
        if *started {
            return;
        }
        *started = true;
        drop(started);
        self.start_narration_event_listener();
    }

    pub(crate) fn format_error(error: &NarratorError) -> String {
        match error {
            NarratorError::AssetNotFound(path) => format!("Audio file not found: {}", path.display()),
            NarratorError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                "Translation file not found for that language.".to_string()
            }
            NarratorError::Json(_) => "Translation file is not valid JSON.".to_string(),
            NarratorError::InvalidSpeed(speed) => format!("Speed {speed} is not allowed."),
            other => format!("Error: {other}"),
        }
    }
}
