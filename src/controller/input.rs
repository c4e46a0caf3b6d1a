//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        // Any key press counts as the user interacting with the page
        self.engine.gate().record_interaction();

        let model = self.model.lock().await;

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    model.clear_error().await;
                    Ok(())
                }
                _ => Ok(()),
            }
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') => {
                    model.hide_help_popup().await;
                    Ok(())
                }
                _ => Ok(()),
            }
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            // Play/Stop toggle
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_narration().await;
            }
            // Next item
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Right => {
                drop(model);
                self.next_item().await;
            }
            // Previous item
            KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Left => {
                drop(model);
                self.previous_item().await;
            }
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Esc => {
                drop(model);
                self.stop_narration().await;
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                drop(model);
                self.toggle_easy_read().await;
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                drop(model);
                self.toggle_describe_images().await;
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                drop(model);
                self.cycle_language().await;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                drop(model);
                self.speed_up().await;
            }
            KeyCode::Char('-') => {
                drop(model);
                self.speed_down().await;
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.toggle_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }
}
