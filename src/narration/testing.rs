//! Scripted in-memory audio backend for engine tests

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{Notify, watch};

use super::player::{AudioBackend, AudioHandle};
use super::speed::PreferenceStore;
use crate::error::NarratorError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behavior {
    /// Finishes right after the first poll
    Complete,
    /// Finishes when the test calls `finish_current`
    Manual,
    /// Loads, then reports a playback error
    Fail,
    /// Cannot be loaded at all
    FailToOpen,
}

struct Script {
    default: Behavior,
    overrides: Mutex<HashMap<PathBuf, Behavior>>,
    opened: Mutex<Vec<PathBuf>>,
    rates: Mutex<Vec<f32>>,
    rewound: Mutex<Vec<PathBuf>>,
    current: Mutex<Option<Arc<Notify>>>,
    open_count: watch::Sender<usize>,
    /// While true, `open` blocks like a slow disk
    held: (Mutex<bool>, Condvar),
    open_started: Notify,
}

#[derive(Clone)]
pub struct ScriptedBackend {
    script: Arc<Script>,
}

impl ScriptedBackend {
    pub fn new(default: Behavior) -> Self {
        let (open_count, _) = watch::channel(0);
        Self {
            script: Arc::new(Script {
                default,
                overrides: Mutex::new(HashMap::new()),
                opened: Mutex::new(Vec::new()),
                rates: Mutex::new(Vec::new()),
                rewound: Mutex::new(Vec::new()),
                current: Mutex::new(None),
                open_count,
                held: (Mutex::new(false), Condvar::new()),
                open_started: Notify::new(),
            }),
        }
    }

    pub fn set_behavior(&self, source: impl Into<PathBuf>, behavior: Behavior) {
        self.script.overrides.lock().unwrap().insert(source.into(), behavior);
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.script.opened.lock().unwrap().clone()
    }

    pub fn rates(&self) -> Vec<f32> {
        self.script.rates.lock().unwrap().clone()
    }

    pub fn was_rewound(&self, source: impl AsRef<Path>) -> bool {
        self.script
            .rewound
            .lock()
            .unwrap()
            .iter()
            .any(|p| p == source.as_ref())
    }

    /// Let the most recently opened manual resource reach its end
    pub fn finish_current(&self) {
        if let Some(release) = self.script.current.lock().unwrap().as_ref() {
            release.notify_one();
        }
    }

    /// Make every following `open` block until `release_opens`
    pub fn hold_opens(&self) {
        *self.script.held.0.lock().unwrap() = true;
    }

    pub fn release_opens(&self) {
        let (held, wake) = &self.script.held;
        *held.lock().unwrap() = false;
        wake.notify_all();
    }

    /// Resolves once some `open` call has begun, even if it is still blocked
    pub async fn open_started(&self) {
        tokio::time::timeout(Duration::from_secs(2), self.script.open_started.notified())
            .await
            .expect("no audio open was started");
    }

    pub async fn wait_for_opens(&self, count: usize) {
        let mut rx = self.script.open_count.subscribe();
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|opened| *opened >= count))
            .await
            .expect("timed out waiting for audio to be opened")
            .expect("open counter dropped");
    }
}

impl AudioBackend for ScriptedBackend {
    fn open(&self, source: &Path) -> Result<Arc<dyn AudioHandle>, NarratorError> {
        self.script.open_started.notify_one();
        {
            let (held, wake) = &self.script.held;
            let mut blocked = held.lock().unwrap();
            while *blocked {
                blocked = wake.wait(blocked).unwrap();
            }
        }

        let behavior = self
            .script
            .overrides
            .lock()
            .unwrap()
            .get(source)
            .copied()
            .unwrap_or(self.script.default);

        if behavior == Behavior::FailToOpen {
            return Err(NarratorError::AssetNotFound(source.to_path_buf()));
        }

        let release = Arc::new(Notify::new());
        *self.script.current.lock().unwrap() = Some(Arc::clone(&release));
        self.script.opened.lock().unwrap().push(source.to_path_buf());
        self.script.open_count.send_modify(|count| *count += 1);

        Ok(Arc::new(ScriptedHandle {
            source: source.to_path_buf(),
            behavior,
            release,
            script: Arc::clone(&self.script),
        }))
    }
}

struct ScriptedHandle {
    source: PathBuf,
    behavior: Behavior,
    release: Arc<Notify>,
    script: Arc<Script>,
}

impl AudioHandle for ScriptedHandle {
    fn finished(&self) -> BoxFuture<'static, Result<(), NarratorError>> {
        match self.behavior {
            Behavior::Complete => async {
                tokio::task::yield_now().await;
                Ok(())
            }
            .boxed(),
            Behavior::Manual => {
                let release = Arc::clone(&self.release);
                async move {
                    release.notified().await;
                    Ok(())
                }
                .boxed()
            }
            Behavior::Fail | Behavior::FailToOpen => {
                let path = self.source.clone();
                async move {
                    Err(NarratorError::Decode {
                        path,
                        reason: "scripted failure".into(),
                    })
                }
                .boxed()
            }
        }
    }

    fn set_rate(&self, rate: f32) {
        self.script.rates.lock().unwrap().push(rate);
    }

    fn resume(&self) {}

    fn pause(&self) {}

    fn rewind(&self) {
        self.script.rewound.lock().unwrap().push(self.source.clone());
    }
}

/// Preference store that keeps the speed in memory
#[derive(Default)]
pub struct MemoryStore {
    speed: Mutex<Option<f32>>,
}

impl PreferenceStore for MemoryStore {
    fn load_speed(&self) -> Option<f32> {
        *self.speed.lock().unwrap()
    }

    fn save_speed(&self, speed: f32) -> Result<(), NarratorError> {
        *self.speed.lock().unwrap() = Some(speed);
        Ok(())
    }
}
