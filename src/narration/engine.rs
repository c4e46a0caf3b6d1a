//! Playback controller: the narration state machine.
//!
//! One [`NarrationEngine`] per page session owns the [`PlaybackState`]. All
//! mutation goes through its operations; the traversal itself runs as a single
//! spawned task that loops over the queue, suspending once per item while the
//! audio player plays it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;

use super::gate::InteractionGate;
use super::highlight::{HighlightCoordinator, HighlightSurface};
use super::player::{AudioBackend, AudioPlayer, PlayOutcome};
use super::playlist::{ContentItem, ItemKind, Playlist, PlaylistSource};
use super::speed::{PreferenceStore, SpeedController};
use crate::error::NarratorError;

const EVENT_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// What the engine reports while it narrates
#[derive(Clone, Debug, PartialEq)]
pub enum NarrationEvent {
    QueueLoaded { len: usize },
    ItemStarted { position: usize, id: String },
    ItemSkipped { position: usize, id: String, direction: Direction },
    ItemFinished { position: usize, id: String, outcome: PlayOutcome },
    /// `reached_end` is false when playback was cancelled
    Stopped { reached_end: bool },
}

/// Read-only view of the playback state for rendering
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackSnapshot {
    pub position: isize,
    pub direction: Direction,
    pub is_playing: bool,
    pub speed: f32,
    pub queue_len: Option<usize>,
    pub current_id: Option<String>,
}

#[derive(Default)]
struct PlaybackState {
    /// Cached queue, `None` until pulled from the source
    queue: Option<Playlist>,
    position: isize,
    direction: Direction,
    is_playing: bool,
    /// The item at `position` has been started at least once
    entered: bool,
    current: Option<ContentItem>,
    /// Bumped on every stop; a traversal only touches state while its epoch is current
    epoch: u64,
    in_flight: bool,
    traversal: Option<JoinHandle<()>>,
}

impl PlaybackState {
    fn item_at_position(&self) -> Option<&ContentItem> {
        let queue = self.queue.as_ref()?;
        usize::try_from(self.position)
            .ok()
            .and_then(|index| queue.items.get(index))
    }

    fn describe_images(&self) -> bool {
        self.queue.as_ref().is_some_and(|q| q.describe_images)
    }
}

struct EngineInner {
    state: Mutex<PlaybackState>,
    source: Arc<dyn PlaylistSource>,
    player: AudioPlayer,
    highlights: HighlightCoordinator,
    speed: SpeedController,
    gate: InteractionGate,
    events: broadcast::Sender<NarrationEvent>,
}

#[derive(Clone)]
pub struct NarrationEngine {
    inner: Arc<EngineInner>,
}

impl NarrationEngine {
    pub fn new(
        source: Arc<dyn PlaylistSource>,
        backend: Arc<dyn AudioBackend>,
        surface: Arc<dyn HighlightSurface>,
        store: Arc<dyn PreferenceStore>,
        gate: InteractionGate,
        item_timeout: Option<Duration>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(EngineInner {
                state: Mutex::new(PlaybackState::default()),
                source,
                player: AudioPlayer::new(backend, item_timeout),
                highlights: HighlightCoordinator::new(surface),
                speed: SpeedController::new(store),
                gate,
                events,
            }),
        }
    }

    /// Start narrating from the current position, or cancel if already playing
    pub async fn toggle(&self) {
        if !self.inner.gate.is_open() {
            tracing::trace!("toggle ignored, no user interaction yet");
            return;
        }

        let mut state = self.inner.state.lock().await;
        if state.is_playing {
            tracing::debug!(position = state.position, "Toggle: stopping");
            self.inner.stop_locked(&mut state);
        } else {
            tracing::debug!(position = state.position, "Toggle: starting");
            self.inner.start_locked(&mut state).await;
        }
    }

    pub async fn next(&self) {
        self.step(Direction::Forward).await;
    }

    pub async fn previous(&self) {
        self.step(Direction::Backward).await;
    }

    async fn step(&self, direction: Direction) {
        if !self.inner.gate.is_open() {
            tracing::trace!(?direction, "step ignored, no user interaction yet");
            return;
        }

        let mut state = self.inner.state.lock().await;
        self.inner.stop_locked(&mut state);
        state.direction = direction;
        if state.entered {
            state.position = (state.position + direction.step()).max(0);
        }
        tracing::debug!(?direction, position = state.position, "Step");
        self.inner.start_locked(&mut state).await;
    }

    /// Cancel narration immediately. Keeps the position so `toggle` resumes there.
    pub async fn stop(&self) {
        let mut state = self.inner.state.lock().await;
        self.inner.stop_locked(&mut state);
    }

    /// Drop the cached queue; the next start pulls a fresh one from the source
    pub async fn invalidate_queue(&self) {
        let mut state = self.inner.state.lock().await;
        self.inner.stop_locked(&mut state);
        state.queue = None;
        state.position = 0;
        state.direction = Direction::Forward;
        state.entered = false;
        tracing::debug!("Queue invalidated");
    }

    pub async fn set_speed(&self, factor: f32) -> Result<(), NarratorError> {
        let _state = self.inner.state.lock().await;
        self.inner.speed.set_speed(factor, &self.inner.player)
    }

    pub fn speed(&self) -> f32 {
        self.inner.speed.speed()
    }

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        let state = self.inner.state.lock().await;
        PlaybackSnapshot {
            position: state.position,
            direction: state.direction,
            is_playing: state.is_playing,
            speed: self.inner.speed.speed(),
            queue_len: state.queue.as_ref().map(|q| q.items.len()),
            current_id: state.current.as_ref().map(|item| item.id.clone()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NarrationEvent> {
        self.inner.events.subscribe()
    }

    /// Play/pause indicator driven by the audio player
    pub fn indicator(&self) -> watch::Receiver<bool> {
        self.inner.player.indicator()
    }

    pub fn has_active_audio(&self) -> bool {
        self.inner.player.has_active()
    }

    pub fn gate(&self) -> &InteractionGate {
        &self.inner.gate
    }

    /// Wait for the traversal in flight, if any, to run to its end
    pub async fn settled(&self) {
        let handle = self.inner.state.lock().await.traversal.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl EngineInner {
    fn emit(&self, event: NarrationEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    async fn ensure_queue(&self, state: &mut PlaybackState) -> bool {
        if state.queue.is_some() {
            return true;
        }
        match self.source.playlist().await {
            Ok(playlist) => {
                tracing::info!(items = playlist.items.len(), describe_images = playlist.describe_images, "Queue loaded");
                self.emit(NarrationEvent::QueueLoaded { len: playlist.items.len() });
                state.queue = Some(playlist);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not build narration queue");
                false
            }
        }
    }

    async fn start_locked(self: &Arc<Self>, state: &mut PlaybackState) {
        if !self.ensure_queue(state).await {
            return;
        }
        state.is_playing = true;

        // Single flight: a second entry while a traversal runs is a no-op
        if state.in_flight {
            tracing::debug!("Traversal already in flight");
            return;
        }
        state.in_flight = true;
        state.epoch += 1;
        let epoch = state.epoch;
        let inner = Arc::clone(self);
        state.traversal = Some(tokio::spawn(inner.traverse(epoch)));
    }

    fn stop_locked(&self, state: &mut PlaybackState) {
        let was_active = state.is_playing || state.in_flight;
        state.is_playing = false;
        state.in_flight = false;
        state.epoch += 1;
        if let Some(traversal) = state.traversal.take() {
            traversal.abort();
        }
        self.player.cancel();
        self.highlights.unhighlight_all();
        state.current = None;

        if was_active {
            tracing::debug!(position = state.position, "Narration stopped");
            self.emit(NarrationEvent::Stopped { reached_end: false });
        }
    }

    /// Ran past either end of the queue: full stop, back to the beginning
    fn finish_locked(&self, state: &mut PlaybackState) {
        tracing::debug!(position = state.position, "End of queue");
        state.is_playing = false;
        state.in_flight = false;
        state.traversal = None;
        state.position = 0;
        state.direction = Direction::Forward;
        state.entered = false;
        state.current = None;
        self.emit(NarrationEvent::Stopped { reached_end: true });
    }

    async fn traverse(self: Arc<Self>, epoch: u64) {
        loop {
            let (position, item) = {
                let mut state = self.state.lock().await;
                if state.epoch != epoch {
                    return;
                }
                if !state.is_playing {
                    state.in_flight = false;
                    return;
                }

                let Some(item) = state.item_at_position().cloned() else {
                    self.finish_locked(&mut state);
                    return;
                };
                let position = state.position.unsigned_abs();

                self.highlights.unhighlight_all();

                if item.kind == ItemKind::Image && !state.describe_images() {
                    tracing::trace!(position, id = %item.id, direction = ?state.direction, "Skipping image");
                    self.emit(NarrationEvent::ItemSkipped {
                        position,
                        id: item.id,
                        direction: state.direction,
                    });
                    state.position += state.direction.step();
                    continue;
                }

                state.entered = true;
                state.current = Some(item.clone());
                self.highlights.highlight(&item);
                (position, item)
            };

            // Disk and decoder work happen without the state lock held
            let loaded = self.player.load(item.audio_ref.as_deref()).await;

            let pending = {
                let state = self.state.lock().await;
                if state.epoch != epoch {
                    // Stopped while loading; dropping `loaded` discards the resource
                    return;
                }
                let pending = self.player.begin(loaded, self.speed.speed());
                tracing::debug!(position, id = %item.id, "Narrating item");
                self.emit(NarrationEvent::ItemStarted {
                    position,
                    id: item.id.clone(),
                });
                pending
            };

            let outcome = pending.wait().await;

            let mut state = self.state.lock().await;
            if state.epoch != epoch {
                // Stopped while waiting; the stop already cleaned up
                return;
            }
            self.highlights.unhighlight(&item);
            state.current = None;
            self.emit(NarrationEvent::ItemFinished {
                position,
                id: item.id,
                outcome,
            });

            if !state.is_playing {
                state.in_flight = false;
                return;
            }
            if state.direction == Direction::Backward {
                state.direction = Direction::Forward;
            }
            state.position += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::highlight::MarkerSet;
    use crate::narration::testing::{Behavior, MemoryStore, ScriptedBackend};
    use futures::future::BoxFuture;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn text(id: &str) -> ContentItem {
        ContentItem::new(id, ItemKind::Text, Some(PathBuf::from(format!("{id}.mp3"))))
    }

    fn image(id: &str) -> ContentItem {
        ContentItem::new(id, ItemKind::Image, Some(PathBuf::from(format!("{id}.mp3"))))
    }

    fn text_images_text_queue(describe_images: bool) -> Playlist {
        Playlist {
            items: vec![text("t0"), image("i1"), image("i2"), text("t3")],
            describe_images,
        }
    }

    struct Harness {
        engine: NarrationEngine,
        backend: ScriptedBackend,
        markers: MarkerSet,
        events: broadcast::Receiver<NarrationEvent>,
    }

    fn harness_with(source: Arc<dyn PlaylistSource>, behavior: Behavior, interacted: bool) -> Harness {
        let backend = ScriptedBackend::new(behavior);
        let markers = MarkerSet::new();
        let gate = InteractionGate::new();
        if interacted {
            gate.record_interaction();
        }
        let engine = NarrationEngine::new(
            source,
            Arc::new(backend.clone()),
            Arc::new(markers.clone()),
            Arc::new(MemoryStore::default()),
            gate,
            None,
        );
        let events = engine.subscribe();
        Harness { engine, backend, markers, events }
    }

    fn harness(queue: Playlist, behavior: Behavior) -> Harness {
        harness_with(Arc::new(queue), behavior, true)
    }

    async fn next_event(events: &mut broadcast::Receiver<NarrationEvent>) -> NarrationEvent {
        tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("no narration event")
            .expect("event channel closed")
    }

    /// Skips over other events until an item starts
    async fn next_started(events: &mut broadcast::Receiver<NarrationEvent>) -> String {
        loop {
            if let NarrationEvent::ItemStarted { id, .. } = next_event(events).await {
                return id;
            }
        }
    }

    fn drain(events: &mut broadcast::Receiver<NarrationEvent>) -> Vec<NarrationEvent> {
        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        seen
    }

    fn started_ids(events: &[NarrationEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                NarrationEvent::ItemStarted { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    fn skipped(events: &[NarrationEvent]) -> Vec<(usize, Direction)> {
        events
            .iter()
            .filter_map(|e| match e {
                NarrationEvent::ItemSkipped { position, direction, .. } => Some((*position, *direction)),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn skips_images_and_stops_at_end_when_not_describing() {
        let mut h = harness(text_images_text_queue(false), Behavior::Complete);

        h.engine.next().await;
        h.engine.settled().await;

        let events = drain(&mut h.events);
        assert_eq!(started_ids(&events), vec!["t0", "t3"]);
        assert_eq!(skipped(&events), vec![(1, Direction::Forward), (2, Direction::Forward)]);
        assert_eq!(events.last(), Some(&NarrationEvent::Stopped { reached_end: true }));
        assert_eq!(h.backend.opened(), vec![PathBuf::from("t0.mp3"), PathBuf::from("t3.mp3")]);

        let snapshot = h.engine.snapshot().await;
        assert!(!snapshot.is_playing);
        assert_eq!(snapshot.position, 0);
        assert_eq!(snapshot.direction, Direction::Forward);
        assert!(h.markers.marked().is_empty());
        assert!(!h.engine.has_active_audio());
    }

    #[tokio::test]
    async fn narrates_images_in_order_when_describing() {
        let mut h = harness(text_images_text_queue(true), Behavior::Complete);

        h.engine.next().await;
        h.engine.settled().await;

        let events = drain(&mut h.events);
        assert_eq!(started_ids(&events), vec!["t0", "i1", "i2", "t3"]);
        assert!(skipped(&events).is_empty());
    }

    #[tokio::test]
    async fn previous_skips_back_over_images_then_resumes_forward() {
        let mut h = harness(text_images_text_queue(false), Behavior::Manual);

        h.engine.toggle().await;
        assert_eq!(next_started(&mut h.events).await, "t0");
        assert!(h.markers.contains("t0"));

        h.engine.next().await;
        assert_eq!(next_started(&mut h.events).await, "t3");
        assert!(!h.markers.contains("t0"));

        drain(&mut h.events);
        h.engine.previous().await;
        let mut seen = Vec::new();
        loop {
            let event = next_event(&mut h.events).await;
            let started = matches!(event, NarrationEvent::ItemStarted { .. });
            seen.push(event);
            if started {
                break;
            }
        }
        assert_eq!(skipped(&seen), vec![(2, Direction::Backward), (1, Direction::Backward)]);
        assert_eq!(started_ids(&seen), vec!["t0"]);
        assert_eq!(h.engine.snapshot().await.direction, Direction::Backward);

        h.backend.finish_current();
        let mut seen = Vec::new();
        loop {
            let event = next_event(&mut h.events).await;
            let started = matches!(event, NarrationEvent::ItemStarted { .. });
            seen.push(event);
            if started {
                break;
            }
        }
        assert_eq!(skipped(&seen), vec![(1, Direction::Forward), (2, Direction::Forward)]);
        assert_eq!(started_ids(&seen), vec!["t3"]);
        assert_eq!(h.engine.snapshot().await.direction, Direction::Forward);

        h.engine.stop().await;
    }

    #[tokio::test]
    async fn long_image_run_never_stalls_in_either_direction() {
        let queue = Playlist {
            items: vec![text("t0"), image("i1"), image("i2"), image("i3"), image("i4"), text("t5")],
            describe_images: false,
        };
        let mut h = harness(queue, Behavior::Manual);

        h.engine.toggle().await;
        assert_eq!(next_started(&mut h.events).await, "t0");
        h.engine.next().await;
        assert_eq!(next_started(&mut h.events).await, "t5");
        h.engine.previous().await;
        assert_eq!(next_started(&mut h.events).await, "t0");

        h.engine.stop().await;
    }

    #[tokio::test]
    async fn previous_on_first_item_restarts_it() {
        let queue = Playlist {
            items: vec![text("t0"), text("t1")],
            describe_images: false,
        };
        let mut h = harness(queue, Behavior::Manual);

        h.engine.toggle().await;
        assert_eq!(next_started(&mut h.events).await, "t0");
        h.backend.wait_for_opens(1).await;

        h.engine.previous().await;
        assert_eq!(next_started(&mut h.events).await, "t0");
        h.backend.wait_for_opens(2).await;

        assert_eq!(h.backend.opened(), vec![PathBuf::from("t0.mp3"), PathBuf::from("t0.mp3")]);
        assert!(h.backend.was_rewound("t0.mp3"));
        let snapshot = h.engine.snapshot().await;
        assert_eq!(snapshot.position, 0);
        assert!(snapshot.is_playing);
        assert_eq!(snapshot.current_id.as_deref(), Some("t0"));

        h.engine.stop().await;
    }

    #[tokio::test]
    async fn slow_audio_load_does_not_block_state_reads() {
        let mut h = harness(text_images_text_queue(false), Behavior::Manual);
        h.backend.hold_opens();

        h.engine.toggle().await;
        h.backend.open_started().await;

        let snapshot = tokio::time::timeout(Duration::from_secs(1), h.engine.snapshot())
            .await
            .expect("snapshot waited on the audio load");
        assert!(snapshot.is_playing);
        assert!(!h.engine.has_active_audio());
        assert!(h.markers.contains("t0"), "highlight comes before the audio is ready");

        h.backend.release_opens();
        assert_eq!(next_started(&mut h.events).await, "t0");
        assert!(h.engine.has_active_audio());

        h.engine.stop().await;
    }

    #[tokio::test]
    async fn stop_during_slow_load_never_starts_the_item() {
        let mut h = harness(text_images_text_queue(false), Behavior::Manual);
        h.backend.hold_opens();

        h.engine.toggle().await;
        h.backend.open_started().await;
        h.engine.stop().await;
        h.backend.release_opens();
        h.backend.wait_for_opens(1).await;
        tokio::task::yield_now().await;

        let events = drain(&mut h.events);
        assert!(started_ids(&events).is_empty());
        assert!(!h.engine.has_active_audio());
        assert!(h.markers.marked().is_empty());
    }

    #[tokio::test]
    async fn backward_past_the_start_through_images_stops() {
        let queue = Playlist {
            items: vec![image("i0"), text("t1")],
            describe_images: false,
        };
        let mut h = harness(queue, Behavior::Manual);

        h.engine.next().await;
        assert_eq!(next_started(&mut h.events).await, "t1");
        h.engine.previous().await;
        h.engine.settled().await;

        let events = drain(&mut h.events);
        assert_eq!(events.last(), Some(&NarrationEvent::Stopped { reached_end: true }));
        let snapshot = h.engine.snapshot().await;
        assert!(!snapshot.is_playing);
        assert_eq!(snapshot.position, 0);
        assert_eq!(snapshot.direction, Direction::Forward);
    }

    #[tokio::test]
    async fn stop_releases_audio_and_markers_and_is_idempotent() {
        let mut h = harness(text_images_text_queue(false), Behavior::Manual);

        h.engine.toggle().await;
        assert_eq!(next_started(&mut h.events).await, "t0");
        assert!(h.engine.has_active_audio());

        h.engine.stop().await;
        let once = h.engine.snapshot().await;
        assert!(!h.engine.has_active_audio());
        assert!(h.markers.marked().is_empty());
        assert!(h.backend.was_rewound("t0.mp3"));
        assert!(!once.is_playing);
        assert_eq!(once.current_id, None);

        h.engine.stop().await;
        h.engine.stop().await;
        assert_eq!(h.engine.snapshot().await, once);
        assert!(!h.engine.has_active_audio());

        let stops = drain(&mut h.events)
            .into_iter()
            .filter(|e| matches!(e, NarrationEvent::Stopped { .. }))
            .count();
        assert_eq!(stops, 1);
    }

    #[tokio::test]
    async fn toggle_resumes_the_interrupted_item() {
        let mut h = harness(text_images_text_queue(false), Behavior::Manual);

        h.engine.toggle().await;
        assert_eq!(next_started(&mut h.events).await, "t0");
        h.engine.toggle().await;
        h.engine.toggle().await;
        assert_eq!(next_started(&mut h.events).await, "t0");

        h.engine.stop().await;
    }

    #[tokio::test]
    async fn rapid_toggles_never_run_two_traversals() {
        let mut h = harness(text_images_text_queue(false), Behavior::Manual);

        h.engine.toggle().await;
        h.engine.toggle().await;
        h.engine.toggle().await;
        assert_eq!(next_started(&mut h.events).await, "t0");
        h.backend.wait_for_opens(1).await;

        {
            let mut state = h.engine.inner.state.lock().await;
            h.engine.inner.start_locked(&mut state).await;
            h.engine.inner.start_locked(&mut state).await;
        }

        h.backend.finish_current();
        assert_eq!(next_started(&mut h.events).await, "t3");
        h.backend.finish_current();
        h.engine.settled().await;

        let events = drain(&mut h.events);
        assert_eq!(started_ids(&events), Vec::<&str>::new());
        assert_eq!(h.backend.opened(), vec![PathBuf::from("t0.mp3"), PathBuf::from("t3.mp3")]);
        assert!(!h.engine.snapshot().await.is_playing);
    }

    #[tokio::test]
    async fn failed_item_does_not_stall_narration() {
        let mut h = harness(text_images_text_queue(false), Behavior::Complete);
        h.backend.set_behavior("t0.mp3", Behavior::Fail);

        h.engine.next().await;
        h.engine.settled().await;

        let events = drain(&mut h.events);
        assert!(events.contains(&NarrationEvent::ItemFinished {
            position: 0,
            id: "t0".into(),
            outcome: PlayOutcome::Failed,
        }));
        assert_eq!(started_ids(&events), vec!["t0", "t3"]);
    }

    #[tokio::test]
    async fn item_without_audio_counts_as_finished() {
        let queue = Playlist {
            items: vec![ContentItem::new("t0", ItemKind::Text, None), text("t1")],
            describe_images: false,
        };
        let mut h = harness(queue, Behavior::Complete);

        h.engine.toggle().await;
        h.engine.settled().await;

        assert_eq!(started_ids(&drain(&mut h.events)), vec!["t0", "t1"]);
        assert_eq!(h.backend.opened(), vec![PathBuf::from("t1.mp3")]);
    }

    #[tokio::test]
    async fn closed_gate_makes_every_operation_a_no_op() {
        let h = harness_with(Arc::new(text_images_text_queue(false)), Behavior::Complete, false);
        let before = h.engine.snapshot().await;

        h.engine.toggle().await;
        h.engine.next().await;
        h.engine.previous().await;

        assert_eq!(h.engine.snapshot().await, before);
        assert_eq!(before.queue_len, None);
        assert!(h.backend.opened().is_empty());
    }

    #[tokio::test]
    async fn speed_applies_now_and_to_later_items() {
        let mut h = harness(text_images_text_queue(false), Behavior::Manual);

        h.engine.toggle().await;
        assert_eq!(next_started(&mut h.events).await, "t0");
        h.engine.set_speed(1.5).await.unwrap();
        assert_eq!(h.backend.rates(), vec![1.0, 1.5]);

        h.backend.finish_current();
        assert_eq!(next_started(&mut h.events).await, "t3");
        assert_eq!(h.backend.rates(), vec![1.0, 1.5, 1.5]);
        assert!(h.engine.set_speed(-1.0).await.is_err());
        assert_eq!(h.engine.speed(), 1.5);

        h.engine.stop().await;
    }

    struct CountingSource {
        playlist: Playlist,
        pulls: AtomicUsize,
    }

    impl PlaylistSource for CountingSource {
        fn playlist(&self) -> BoxFuture<'_, Result<Playlist, NarratorError>> {
            self.pulls.fetch_add(1, Ordering::SeqCst);
            self.playlist.playlist()
        }
    }

    #[tokio::test]
    async fn queue_is_cached_until_invalidated() {
        let source = Arc::new(CountingSource {
            playlist: text_images_text_queue(false),
            pulls: AtomicUsize::new(0),
        });
        let h = harness_with(source.clone(), Behavior::Complete, true);

        h.engine.toggle().await;
        h.engine.settled().await;
        h.engine.toggle().await;
        h.engine.settled().await;
        assert_eq!(source.pulls.load(Ordering::SeqCst), 1);

        h.engine.invalidate_queue().await;
        assert_eq!(h.engine.snapshot().await.queue_len, None);
        h.engine.toggle().await;
        h.engine.settled().await;
        assert_eq!(source.pulls.load(Ordering::SeqCst), 2);
    }

    struct BrokenSource;

    impl PlaylistSource for BrokenSource {
        fn playlist(&self) -> BoxFuture<'_, Result<Playlist, NarratorError>> {
            Box::pin(async { Err(NarratorError::MissingContentRoot) })
        }
    }

    #[tokio::test]
    async fn unbuildable_queue_leaves_engine_stopped() {
        let h = harness_with(Arc::new(BrokenSource), Behavior::Complete, true);

        h.engine.toggle().await;

        assert!(!h.engine.snapshot().await.is_playing);
        assert!(h.backend.opened().is_empty());
    }
}
