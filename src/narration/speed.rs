//! Speed controller: holds the playback-rate preference and applies it

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use super::player::AudioPlayer;
use crate::error::NarratorError;

pub const DEFAULT_SPEED: f32 = 1.0;

/// Persistence collaborator for the speed preference
pub trait PreferenceStore: Send + Sync {
    fn load_speed(&self) -> Option<f32>;
    fn save_speed(&self, speed: f32) -> Result<(), NarratorError>;
}

pub fn is_valid_speed(factor: f32) -> bool {
    factor.is_finite() && factor > 0.0
}

pub struct SpeedController {
    bits: AtomicU32,
    store: Arc<dyn PreferenceStore>,
}

impl SpeedController {
    /// Start from the stored preference, falling back to normal speed
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        let speed = match store.load_speed() {
            Some(stored) if is_valid_speed(stored) => stored,
            Some(stored) => {
                tracing::warn!(stored, "Ignoring invalid stored speed");
                DEFAULT_SPEED
            }
            None => DEFAULT_SPEED,
        };
        tracing::debug!(speed, "Speed preference loaded");
        Self {
            bits: AtomicU32::new(speed.to_bits()),
            store,
        }
    }

    pub fn speed(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::SeqCst))
    }

    /// Persist `factor`, apply it to whatever is playing right now, and use it
    /// for every later item.
    pub fn set_speed(&self, factor: f32, player: &AudioPlayer) -> Result<(), NarratorError> {
        if !is_valid_speed(factor) {
            return Err(NarratorError::InvalidSpeed(factor));
        }

        self.bits.store(factor.to_bits(), Ordering::SeqCst);
        if let Err(e) = self.store.save_speed(factor) {
            tracing::warn!(error = %e, speed = factor, "Failed to persist speed preference");
        }
        player.set_rate(factor);
        tracing::info!(speed = factor, "Playback speed changed");
        Ok(())
    }
}
