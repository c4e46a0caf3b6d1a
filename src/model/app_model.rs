//! Main application model with state management

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use tokio::sync::{Mutex, RwLock};

use super::assets::AssetMap;
use super::content::Page;
use super::types::{DisplayItem, UiState};
use crate::error::NarratorError;
use crate::narration::{MarkerSet, ModeFlags, Playlist, PlaylistSource, build_playlist};

const ERROR_DISPLAY_SECS: u64 = 5;

/// Everything the playlist is built from
pub struct ContentState {
    pub page: Page,
    pub assets: AssetMap,
    pub flags: ModeFlags,
    pub languages: Vec<String>,
    pub translations_dir: PathBuf,
    pub audio_root: PathBuf,
}

/// Shared handle to the loaded page, its assets and the active mode flags.
///
/// Serves as the engine's [`PlaylistSource`]; every pull reflects the flags
/// and language in effect at that moment. The item list shown by the view is
/// cached and rebuilt only after a mode or language change.
#[derive(Clone)]
pub struct PageContent {
    state: Arc<RwLock<ContentState>>,
    display: Arc<RwLock<Option<Vec<DisplayItem>>>>,
}

impl PageContent {
    pub fn new(state: ContentState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            display: Arc::new(RwLock::new(None)),
        }
    }

    async fn invalidate_display(&self) {
        *self.display.write().await = None;
    }

    pub async fn flags(&self) -> ModeFlags {
        self.state.read().await.flags
    }

    pub async fn lang(&self) -> String {
        self.state.read().await.assets.lang().to_string()
    }

    pub async fn title(&self) -> String {
        self.state.read().await.page.title.clone().unwrap_or_default()
    }

    /// Returns the new value
    pub async fn toggle_easy_read(&self) -> bool {
        let mut state = self.state.write().await;
        state.flags.easy_read = !state.flags.easy_read;
        let enabled = state.flags.easy_read;
        drop(state);
        self.invalidate_display().await;
        enabled
    }

    /// Returns the new value
    pub async fn toggle_describe_images(&self) -> bool {
        let mut state = self.state.write().await;
        state.flags.describe_images = !state.flags.describe_images;
        let enabled = state.flags.describe_images;
        drop(state);
        self.invalidate_display().await;
        enabled
    }

    pub async fn switch_language(&self, lang: &str) -> Result<(), NarratorError> {
        let (dir, audio_root) = {
            let state = self.state.read().await;
            (state.translations_dir.clone(), state.audio_root.clone())
        };
        let assets = AssetMap::load(&dir, lang, &audio_root)?;
        self.state.write().await.assets = assets;
        self.invalidate_display().await;
        tracing::info!(lang, "Language switched");
        Ok(())
    }

    /// Move to the next available language, wrapping around.
    /// Returns `None` when there is nothing to switch to.
    pub async fn cycle_language(&self) -> Result<Option<String>, NarratorError> {
        let next = {
            let state = self.state.read().await;
            let current = state.assets.lang();
            match state.languages.iter().position(|l| l == current) {
                Some(index) => state.languages.get((index + 1) % state.languages.len()).cloned(),
                None => state.languages.first().cloned(),
            }
        };

        match next {
            Some(lang) if lang != self.lang().await => {
                self.switch_language(&lang).await?;
                Ok(Some(lang))
            }
            _ => Ok(None),
        }
    }

    /// Queue items with their display text, in narration order
    pub async fn display_items(&self) -> Vec<DisplayItem> {
        if let Some(items) = self.display.read().await.as_ref() {
            return items.clone();
        }

        let items = self.build_display_items().await;
        *self.display.write().await = Some(items.clone());
        items
    }

    async fn build_display_items(&self) -> Vec<DisplayItem> {
        let state = self.state.read().await;
        let Ok(playlist) = build_playlist(&state.page, state.flags, &state.assets) else {
            return Vec::new();
        };

        playlist
            .items
            .into_iter()
            .map(|item| DisplayItem {
                text: state
                    .assets
                    .display_text(&item.id, state.flags.easy_read)
                    .unwrap_or(&item.id)
                    .to_string(),
                id: item.id,
                kind: item.kind,
            })
            .collect()
    }
}

impl PlaylistSource for PageContent {
    fn playlist(&self) -> BoxFuture<'_, Result<Playlist, NarratorError>> {
        Box::pin(async move {
            let state = self.state.read().await;
            build_playlist(&state.page, state.flags, &state.assets)
        })
    }
}

/// Main application model containing all state
pub struct AppModel {
    pub content: PageContent,
    /// Items currently highlighted by the narrator
    pub markers: MarkerSet,
    pub ui_state: Arc<Mutex<UiState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(content: PageContent, markers: MarkerSet) -> Self {
        Self {
            content,
            markers,
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn set_status(&self, status: String) {
        self.ui_state.lock().await.status_line = status;
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > ERROR_DISPLAY_SECS {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn toggle_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help_popup = !state.show_help_popup;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }
}
