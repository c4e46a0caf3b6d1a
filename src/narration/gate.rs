//! Interaction gate: no narration until the user has interacted with the page.
//!
//! Audio output may not start on its own right after load. Every engine
//! operation checks this gate first and silently does nothing while it is
//! closed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag flipped by the host on the first user interaction.
#[derive(Debug, Clone, Default)]
pub struct InteractionGate {
    interacted: Arc<AtomicBool>,
}

impl InteractionGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user interaction. Only the first call changes anything.
    pub fn record_interaction(&self) {
        if !self.interacted.swap(true, Ordering::SeqCst) {
            tracing::debug!("Interaction gate opened");
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.interacted.load(Ordering::SeqCst)
    }
}
