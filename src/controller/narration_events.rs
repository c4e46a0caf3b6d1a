//! Narration event listener

use tokio::sync::broadcast::error::RecvError;

use crate::model::describe_event;
use crate::narration::{NarrationEvent, PlayOutcome};
use super::AppController;

impl AppController {
    pub fn start_narration_event_listener(&self) {
        let model = self.model.clone();
        let mut events = self.engine.subscribe();
        tracing::info!("Starting narration event listener");

        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Narration event listener lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                let model_guard = model.lock().await;
                if model_guard.should_quit().await {
                    tracing::debug!("Narration event listener shutting down");
                    break;
                }

                match &event {
                    NarrationEvent::ItemStarted { position, id } => {
                        tracing::trace!(position, id = %id, "NarrationEvent::ItemStarted");
                    }
                    NarrationEvent::ItemFinished { id, outcome: PlayOutcome::Failed, .. } => {
                        tracing::warn!(id = %id, "Item could not be played");
                    }
                    other => {
                        tracing::trace!(event = ?other, "NarrationEvent");
                    }
                }

                model_guard.set_status(describe_event(&event)).await;
            }
        });
    }
}
