//! Audio output through `rodio`.
//!
//! `rodio::OutputStream` is `!Send` on some platforms, so it lives on a
//! dedicated thread for the lifetime of the backend. Only the `Send + Sync`
//! stream handle crosses back to the runtime. `open` reads and decodes the
//! file, so the player calls it from the blocking pool.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::error::NarratorError;
use crate::narration::{AudioBackend, AudioHandle};

const AUDIO_THREAD_NAME: &str = "narrator-audio";

pub struct RodioBackend {
    stream_handle: OutputStreamHandle,
    // Dropping the sender lets the audio thread exit and close the stream
    _shutdown: mpsc::Sender<()>,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn new() -> Result<Self, NarratorError> {
        let (init_tx, init_rx) = mpsc::channel::<Result<OutputStreamHandle, NarratorError>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name(AUDIO_THREAD_NAME.into())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = init_tx.send(Ok(handle));
                    let _ = shutdown_rx.recv();
                    drop(stream);
                    tracing::debug!("Audio output thread exiting");
                }
                Err(e) => {
                    let _ = init_tx.send(Err(NarratorError::OutputStream(e.to_string())));
                }
            })
            .map_err(|e| NarratorError::OutputStream(format!("failed to spawn audio thread: {e}")))?;

        let stream_handle = init_rx.recv().map_err(|_| NarratorError::AudioThreadDied)??;
        tracing::info!("Audio output initialized on default device");

        Ok(Self {
            stream_handle,
            _shutdown: shutdown_tx,
        })
    }
}

impl AudioBackend for RodioBackend {
    fn open(&self, source: &Path) -> Result<Arc<dyn AudioHandle>, NarratorError> {
        let file = File::open(source).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => NarratorError::AssetNotFound(source.to_path_buf()),
            _ => NarratorError::Io(e),
        })?;

        let decoder = Decoder::new(BufReader::new(file)).map_err(|e| NarratorError::Decode {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| NarratorError::OutputStream(e.to_string()))?;
        // Silent until the player takes ownership
        sink.pause();
        sink.append(decoder);

        Ok(Arc::new(RodioHandle {
            sink: Arc::new(sink),
            source: source.to_path_buf(),
        }))
    }
}

struct RodioHandle {
    sink: Arc<Sink>,
    source: PathBuf,
}

impl AudioHandle for RodioHandle {
    fn finished(&self) -> BoxFuture<'static, Result<(), NarratorError>> {
        let sink = Arc::clone(&self.sink);
        async move {
            // Returns once the queue drains or the sink is stopped
            tokio::task::spawn_blocking(move || sink.sleep_until_end())
                .await
                .map_err(|e| NarratorError::OutputStream(format!("completion watcher failed: {e}")))
        }
        .boxed()
    }

    fn set_rate(&self, rate: f32) {
        self.sink.set_speed(rate);
    }

    fn resume(&self) {
        self.sink.play();
    }

    fn pause(&self) {
        self.sink.pause();
    }

    fn rewind(&self) {
        if let Err(e) = self.sink.try_seek(Duration::ZERO) {
            tracing::debug!(source = %self.source.display(), error = %e, "Could not rewind audio");
        }
    }
}

impl Drop for RodioHandle {
    fn drop(&mut self) {
        self.sink.stop();
    }
}
