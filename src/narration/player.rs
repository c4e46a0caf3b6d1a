//! Single-flight audio player.
//!
//! Owns at most one audio resource at a time. [`AudioPlayer::play`] suspends
//! the caller until the resource finishes, fails or is cancelled; failures are
//! resolved into a [`PlayOutcome`] so a traversal never stalls on a bad asset.
//!
//! Playing is split in three steps: [`AudioPlayer::load`] opens and decodes on
//! the blocking pool, [`AudioPlayer::begin`] takes ownership and starts output,
//! [`PendingPlay::wait`] suspends until the end. Only `begin` needs to run
//! under the caller's lock.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{oneshot, watch};

use crate::error::NarratorError;

/// One loaded audio resource. Opened paused; output starts on `resume`.
pub trait AudioHandle: Send + Sync {
    /// Resolves when playback reaches the end, or with an error if it cannot
    /// continue. Does not resolve on `pause`.
    fn finished(&self) -> BoxFuture<'static, Result<(), NarratorError>>;
    fn set_rate(&self, rate: f32);
    fn resume(&self);
    fn pause(&self);
    /// Move the playhead back to the start
    fn rewind(&self);
}

/// Something that can turn an audio reference into a paused resource.
/// `open` may block on disk and decoder work.
pub trait AudioBackend: Send + Sync {
    fn open(&self, source: &Path) -> Result<Arc<dyn AudioHandle>, NarratorError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    Completed,
    Failed,
    Cancelled,
    TimedOut,
}

/// An opened resource that has not started yet. Dropping it releases the
/// resource without it ever being heard.
pub struct LoadedAudio {
    source: PathBuf,
    handle: Arc<dyn AudioHandle>,
}

impl LoadedAudio {
    pub fn source(&self) -> &Path {
        &self.source
    }
}

struct ActiveResource {
    token: u64,
    handle: Arc<dyn AudioHandle>,
    cancel: oneshot::Sender<()>,
}

enum Pending {
    Ready(PlayOutcome),
    Waiting {
        token: u64,
        source: PathBuf,
        finished: BoxFuture<'static, Result<(), NarratorError>>,
        cancel_rx: oneshot::Receiver<()>,
    },
}

/// A resource that has been started and is owned by the player
pub struct PendingPlay<'a> {
    player: &'a AudioPlayer,
    state: Pending,
}

impl<'a> PendingPlay<'a> {
    fn ready(player: &'a AudioPlayer, outcome: PlayOutcome) -> Self {
        Self {
            player,
            state: Pending::Ready(outcome),
        }
    }

    /// Suspend until the resource ends, fails, times out or is cancelled
    pub async fn wait(self) -> PlayOutcome {
        let (token, source, finished, cancel_rx) = match self.state {
            Pending::Ready(outcome) => return outcome,
            Pending::Waiting { token, source, finished, cancel_rx } => (token, source, finished, cancel_rx),
        };

        let item_timeout = self.player.item_timeout;
        let completion = async {
            let result = match item_timeout {
                Some(limit) => match tokio::time::timeout(limit, finished).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(source = %source.display(), ?limit, "Audio did not finish in time, moving on");
                        return PlayOutcome::TimedOut;
                    }
                },
                None => finished.await,
            };
            match result {
                Ok(()) => PlayOutcome::Completed,
                Err(e) => {
                    tracing::warn!(source = %source.display(), error = %e, "Audio playback failed, moving on");
                    PlayOutcome::Failed
                }
            }
        };

        let outcome = tokio::select! {
            outcome = completion => outcome,
            _ = cancel_rx => PlayOutcome::Cancelled,
        };

        if outcome != PlayOutcome::Cancelled {
            self.player.release(token);
        }
        outcome
    }
}

pub struct AudioPlayer {
    backend: Arc<dyn AudioBackend>,
    active: Mutex<Option<ActiveResource>>,
    next_token: AtomicU64,
    indicator: watch::Sender<bool>,
    item_timeout: Option<Duration>,
}

impl AudioPlayer {
    pub fn new(backend: Arc<dyn AudioBackend>, item_timeout: Option<Duration>) -> Self {
        let (indicator, _) = watch::channel(false);
        Self {
            backend,
            active: Mutex::new(None),
            next_token: AtomicU64::new(1),
            indicator,
            item_timeout,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<ActiveResource>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Play `source` at `rate` and wait for it to end.
    ///
    /// Any resource still owned from an earlier call is cancelled first.
    pub async fn play(&self, source: Option<&Path>, rate: f32) -> PlayOutcome {
        let loaded = self.load(source).await;
        self.begin(loaded, rate).wait().await
    }

    /// Open and decode `source` off the async runtime.
    ///
    /// `None` when there is no reference or it cannot be loaded; the failure
    /// is logged and `begin` turns it into [`PlayOutcome::Failed`].
    pub async fn load(&self, source: Option<&Path>) -> Option<LoadedAudio> {
        let Some(source) = source else {
            tracing::warn!("Item has no audio reference, treating as finished");
            return None;
        };

        let backend = Arc::clone(&self.backend);
        let path = source.to_path_buf();
        let opened = tokio::task::spawn_blocking(move || backend.open(&path))
            .await
            .map_err(|e| NarratorError::OutputStream(format!("audio loader failed: {e}")))
            .and_then(|result| result);

        match opened {
            Ok(handle) => Some(LoadedAudio {
                source: source.to_path_buf(),
                handle,
            }),
            Err(e) => {
                tracing::warn!(source = %source.display(), error = %e, "Failed to load audio, skipping item");
                None
            }
        }
    }

    /// Take ownership of a loaded resource and start it without waiting.
    ///
    /// Registration happens synchronously, so a `cancel` issued after this
    /// returns always reaches the new resource.
    pub fn begin(&self, loaded: Option<LoadedAudio>, rate: f32) -> PendingPlay<'_> {
        self.cancel();

        let Some(LoadedAudio { source, handle }) = loaded else {
            return PendingPlay::ready(self, PlayOutcome::Failed);
        };

        handle.set_rate(rate);
        handle.resume();

        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let finished = handle.finished();
        *self.slot() = Some(ActiveResource {
            token,
            handle,
            cancel: cancel_tx,
        });
        self.indicator.send_replace(true);
        tracing::debug!(source = %source.display(), rate, "Audio playback started");

        PendingPlay {
            player: self,
            state: Pending::Waiting {
                token,
                source,
                finished,
                cancel_rx,
            },
        }
    }

    fn release(&self, token: u64) {
        let released = {
            let mut slot = self.slot();
            match slot.as_ref() {
                Some(active) if active.token == token => slot.take(),
                _ => None,
            }
        };
        if let Some(active) = released {
            active.handle.pause();
            self.indicator.send_replace(false);
        }
    }

    /// Pause and rewind the active resource and give up ownership of it.
    /// Does nothing when no resource is active.
    pub fn cancel(&self) {
        let Some(active) = self.slot().take() else {
            return;
        };
        active.handle.pause();
        active.handle.rewind();
        let _ = active.cancel.send(());
        self.indicator.send_replace(false);
        tracing::debug!("Audio playback cancelled");
    }

    /// Change the rate of the resource currently playing, if any
    pub fn set_rate(&self, rate: f32) {
        if let Some(active) = self.slot().as_ref() {
            active.handle.set_rate(rate);
        }
    }

    pub fn has_active(&self) -> bool {
        self.slot().is_some()
    }

    /// Play/pause indicator, `true` while a resource is playing
    pub fn indicator(&self) -> watch::Receiver<bool> {
        self.indicator.subscribe()
    }
}
