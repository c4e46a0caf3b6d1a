//! Narration control methods

use super::AppController;

/// Speed steps offered by the `+`/`-` keys
pub const SPEED_PRESETS: [f32; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

const PRESET_EPSILON: f32 = 0.001;

/// Next preset above `current`, saturating at the fastest
pub fn faster_preset(current: f32) -> f32 {
    SPEED_PRESETS
        .iter()
        .copied()
        .find(|preset| *preset > current + PRESET_EPSILON)
        .unwrap_or(SPEED_PRESETS[SPEED_PRESETS.len() - 1])
}

/// Next preset below `current`, saturating at the slowest
pub fn slower_preset(current: f32) -> f32 {
    SPEED_PRESETS
        .iter()
        .rev()
        .copied()
        .find(|preset| *preset < current - PRESET_EPSILON)
        .unwrap_or(SPEED_PRESETS[0])
}

impl AppController {
    pub async fn toggle_narration(&self) {
        tracing::debug!("Toggling narration");
        self.engine.toggle().await;
    }

    pub async fn next_item(&self) {
        tracing::debug!("Skipping to next item");
        self.engine.next().await;
    }

    pub async fn previous_item(&self) {
        tracing::debug!("Going back to previous item");
        self.engine.previous().await;
    }

    pub async fn stop_narration(&self) {
        self.engine.stop().await;
    }

    pub async fn toggle_easy_read(&self) {
        let model = self.model.lock().await;
        let enabled = model.content.toggle_easy_read().await;
        model
            .set_status(format!("Easy read {}", if enabled { "on" } else { "off" }))
            .await;
        drop(model);

        self.engine.invalidate_queue().await;
        tracing::info!(enabled, "Easy read toggled");
    }

    pub async fn toggle_describe_images(&self) {
        let model = self.model.lock().await;
        let enabled = model.content.toggle_describe_images().await;
        model
            .set_status(format!("Image descriptions {}", if enabled { "on" } else { "off" }))
            .await;
        drop(model);

        self.engine.invalidate_queue().await;
        tracing::info!(enabled, "Image descriptions toggled");
    }

    pub async fn cycle_language(&self) {
        let model = self.model.lock().await;
        match model.content.cycle_language().await {
            Ok(Some(lang)) => {
                model.set_status(format!("Language: {lang}")).await;
                drop(model);
                self.engine.invalidate_queue().await;
            }
            Ok(None) => {
                model.set_status("No other language available".to_string()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Language switch failed");
                model.set_error(Self::format_error(&e)).await;
            }
        }
    }

    pub async fn speed_up(&self) {
        self.apply_speed(faster_preset(self.engine.speed())).await;
    }

    pub async fn speed_down(&self) {
        self.apply_speed(slower_preset(self.engine.speed())).await;
    }

    async fn apply_speed(&self, speed: f32) {
        let result = self.engine.set_speed(speed).await;
        let model = self.model.lock().await;
        match result {
            Ok(()) => model.set_status(format!("Speed {speed}x")).await,
            Err(e) => {
                tracing::error!(error = %e, speed, "Speed change failed");
                model.set_error(Self::format_error(&e)).await;
            }
        }
    }
}
