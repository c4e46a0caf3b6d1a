//! Core type definitions for the application

use std::time::Instant;

use crate::narration::ItemKind;

/// A queue entry as shown in the page pane
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayItem {
    pub id: String,
    pub kind: ItemKind,
    pub text: String,
}

/// UI state for the application
#[derive(Clone, Debug)]
pub struct UiState {
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
    /// Last thing the narrator reported, shown under the page
    pub status_line: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            error_message: None,
            error_timestamp: None,
            show_help_popup: false,
            status_line: "Press any key, then Space to start narrating".to_string(),
        }
    }
}
