//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Main layout structure (top bar, status line)
//! - `content`: Page item list with the narration marker
//! - `progress`: Narration progress bar
//! - `overlays`: Modal overlays (error, help)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{DisplayItem, PlaybackInfo, UiState};

pub struct AppView;

impl AppView {
    pub fn render(
        frame: &mut Frame,
        playback: &PlaybackInfo,
        ui_state: &UiState,
        items: &[DisplayItem],
        marked: &[String],
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Page title + language
                Constraint::Min(0),    // Page items
                Constraint::Length(3), // Progress bar with narration info
                Constraint::Length(1), // Status line
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], playback);

        content::render_page_items(frame, chunks[1], items, marked, playback);

        progress::render_progress_bar(frame, chunks[2], playback);

        layout::render_status_line(frame, chunks[3], ui_state);

        // Error notification overlay (if there's an error)
        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        // Help popup overlay (if open)
        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}
