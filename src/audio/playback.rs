use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::clip::SpeechClip;
use crate::error::PlaybackError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackSink {
    /// Waits out the clip duration without producing sound.
    Silent,
    /// External player invoked with a temporary WAV path as last argument.
    Command(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Finished,
    Cancelled,
}

/// At most one clip plays at a time.
pub struct Playback {
    sink: PlaybackSink,
    /// Where command sinks put their WAV. System temp dir when unset.
    scratch_dir: Option<PathBuf>,
    active: Arc<AtomicBool>,
    cancel: Mutex<Option<CancellationToken>>,
}

/// Clears the active flag however the task ends.
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Playback {
    pub fn new(sink: PlaybackSink) -> Self {
        Self {
            sink,
            scratch_dir: None,
            active: Arc::new(AtomicBool::new(false)),
            cancel: Mutex::new(None),
        }
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn start(
        &self,
        clip: SpeechClip,
    ) -> Result<JoinHandle<Result<PlaybackOutcome, PlaybackError>>, PlaybackError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PlaybackError::Busy);
        }
        let guard = ActiveGuard(self.active.clone());

        let token = CancellationToken::new();
        *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());

        let sink = self.sink.clone();
        let scratch_dir = self.scratch_dir.clone();
        info!(ms = clip.duration().as_millis() as u64, "playback started");
        Ok(tokio::spawn(async move {
            let _guard = guard;
            let outcome = match sink {
                PlaybackSink::Silent => play_silent(&clip, &token).await,
                PlaybackSink::Command(cmd) => {
                    play_command(&cmd, &clip, scratch_dir, &token).await
                }
            };
            match &outcome {
                Ok(o) => info!(outcome = ?o, "playback ended"),
                Err(e) => warn!("playback failed: {}", e),
            }
            outcome
        }))
    }

    /// Cancels the active playback, if any.
    pub fn stop(&self) {
        if let Some(token) = self
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }
}

async fn play_silent(
    clip: &SpeechClip,
    token: &CancellationToken,
) -> Result<PlaybackOutcome, PlaybackError> {
    tokio::select! {
        _ = tokio::time::sleep(clip.duration()) => Ok(PlaybackOutcome::Finished),
        _ = token.cancelled() => Ok(PlaybackOutcome::Cancelled),
    }
}

async fn play_command(
    cmd: &str,
    clip: &SpeechClip,
    scratch_dir: Option<PathBuf>,
    token: &CancellationToken,
) -> Result<PlaybackOutcome, PlaybackError> {
    let mut words = cmd.split_whitespace();
    let program = words.next().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty player command")
    })?;

    // Removed on drop, including when the task is aborted mid-play.
    let mut builder = tempfile::Builder::new();
    builder.prefix("cortex-").suffix(".wav");
    let mut wav = match scratch_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    clip.write_wav_to(wav.as_file_mut())?;

    let mut child = tokio::process::Command::new(program)
        .args(words)
        .arg(wav.path())
        .kill_on_drop(true)
        .spawn()?;

    tokio::select! {
        status = child.wait() => {
            let status = status?;
            if !status.success() {
                warn!(%status, "player exited with failure");
            }
            Ok(PlaybackOutcome::Finished)
        }
        _ = token.cancelled() => {
            let _ = child.kill().await;
            Ok(PlaybackOutcome::Cancelled)
        }
    }
}
