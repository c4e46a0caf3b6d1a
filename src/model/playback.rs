//! Playback-related view state

use crate::narration::{Direction, ModeFlags, NarrationEvent, PlayOutcome, PlaybackSnapshot};

/// Complete playback information for rendering the UI
#[derive(Clone, Debug)]
pub struct PlaybackInfo {
    pub snapshot: PlaybackSnapshot,
    /// Play/pause indicator as reported by the audio player
    pub audio_active: bool,
    pub flags: ModeFlags,
    pub lang: String,
    pub title: String,
}

impl PlaybackInfo {
    /// Fraction of the queue already behind the current position
    pub fn progress_ratio(&self) -> f64 {
        match self.snapshot.queue_len {
            Some(len) if len > 0 => (self.snapshot.position.max(0) as f64 / len as f64).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

/// One-line description of a narration event for the status bar
pub fn describe_event(event: &NarrationEvent) -> String {
    match event {
        NarrationEvent::QueueLoaded { len } => format!("Queue ready: {len} items"),
        NarrationEvent::ItemStarted { position, id } => format!("Narrating #{} ({id})", position + 1),
        NarrationEvent::ItemSkipped { position, id, direction } => {
            let arrow = match direction {
                Direction::Forward => "→",
                Direction::Backward => "←",
            };
            format!("Skipped image #{} ({id}) {arrow}", position + 1)
        }
        NarrationEvent::ItemFinished { position, id, outcome } => match outcome {
            PlayOutcome::Completed => format!("Finished #{} ({id})", position + 1),
            PlayOutcome::Failed => format!("Could not play #{} ({id}), moving on", position + 1),
            PlayOutcome::TimedOut => format!("#{} ({id}) took too long, moving on", position + 1),
            PlayOutcome::Cancelled => format!("Interrupted #{} ({id})", position + 1),
        },
        NarrationEvent::Stopped { reached_end: true } => "End of page".to_string(),
        NarrationEvent::Stopped { reached_end: false } => "Stopped".to_string(),
    }
}
