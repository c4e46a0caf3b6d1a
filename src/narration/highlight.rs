//! Highlight coordinator: keeps the visual marker on the narrated item only

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use super::playlist::ContentItem;

/// Marker hooks exposed by the host page. Both operations must be idempotent.
pub trait HighlightSurface: Send + Sync {
    fn mark(&self, id: &str);
    fn unmark(&self, id: &str);
    /// Identifiers of every node currently carrying a marker
    fn marked(&self) -> Vec<String>;
}

/// Marker set kept in memory; the terminal view renders from it
#[derive(Clone, Debug, Default)]
pub struct MarkerSet {
    marked: Arc<Mutex<BTreeSet<String>>>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.marked.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.set().contains(id)
    }
}

impl HighlightSurface for MarkerSet {
    fn mark(&self, id: &str) {
        self.set().insert(id.to_string());
    }

    fn unmark(&self, id: &str) {
        self.set().remove(id);
    }

    fn marked(&self) -> Vec<String> {
        self.set().iter().cloned().collect()
    }
}

#[derive(Clone)]
pub struct HighlightCoordinator {
    surface: Arc<dyn HighlightSurface>,
}

impl HighlightCoordinator {
    pub fn new(surface: Arc<dyn HighlightSurface>) -> Self {
        Self { surface }
    }

    pub fn highlight(&self, item: &ContentItem) {
        self.surface.mark(&item.id);
    }

    pub fn unhighlight(&self, item: &ContentItem) {
        self.surface.unmark(&item.id);
    }

    /// Clear every marker on the page, not only the ones this coordinator set
    pub fn unhighlight_all(&self) {
        for id in self.surface.marked() {
            self.surface.unmark(&id);
        }
    }
}
