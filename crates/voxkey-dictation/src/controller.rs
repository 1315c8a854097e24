//! Push-to-talk session lifecycle.
//!
//! The controller reacts to trigger-key transitions coming off the OS
//! listener thread: key-down starts exactly one transcription worker,
//! key-up stops it. The session state and the worker handle are the only
//! cross-thread mutable state, guarded by one lock held only for the
//! transitions themselves.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use voxkey_audio::AudioSource;
use voxkey_core::config::VoxkeyConfig;
use voxkey_core::error::Result;
use voxkey_core::types::TypingMode;
use voxkey_stt::RecognizerSession;

use crate::cancel::CancelToken;
use crate::inject::KeystrokeInjector;
use crate::shaper::TextShaper;
use crate::state::SessionState;
use crate::worker::TranscriptionWorker;

/// Factory producing a fresh audio source for each recording session.
pub type AudioSourceFactory = Box<dyn Fn() -> Result<Box<dyn AudioSource>> + Send + Sync>;

/// Factory producing a fresh recognizer session for each recording session.
pub type RecognizerFactory = Box<dyn Fn() -> Result<Box<dyn RecognizerSession>> + Send + Sync>;

/// What happened on a trigger release.
///
/// `StoppedAfterTimeout` is the observable form of a worker that did not
/// acknowledge the stop within the bound: the controller has already
/// returned to idle and the worker winds down detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The worker acknowledged the stop within the bound.
    Stopped,
    /// The worker missed the stop deadline; idle anyway.
    StoppedAfterTimeout,
    /// No session was running.
    AlreadyIdle,
}

/// Per-session settings the controller hands to each worker.
pub struct SessionSettings {
    pub mode: TypingMode,
    pub pause_delay: Duration,
    pub stop_timeout: Duration,
    pub commands: Arc<HashMap<String, String>>,
}

impl SessionSettings {
    pub fn from_config(config: &VoxkeyConfig) -> Self {
        Self {
            mode: config.dictation.typing_mode,
            pause_delay: Duration::from_secs_f64(config.dictation.pause_delay_secs.max(0.0)),
            stop_timeout: Duration::from_millis(config.dictation.stop_timeout_ms),
            commands: Arc::new(config.commands.clone()),
        }
    }
}

struct WorkerHandle {
    session_id: Uuid,
    cancel: CancelToken,
    join: JoinHandle<()>,
    done: Receiver<()>,
}

struct ControllerInner {
    state: SessionState,
    worker: Option<WorkerHandle>,
}

/// The state machine reacting to trigger-key down/up events.
///
/// Neither entry point panics or returns an error to the caller: the key
/// listener has no way to handle one, so every worker-side failure is
/// absorbed and logged here.
pub struct SessionController {
    inner: Mutex<ControllerInner>,
    settings: SessionSettings,
    audio_factory: AudioSourceFactory,
    recognizer_factory: RecognizerFactory,
    injector: Arc<dyn KeystrokeInjector>,
}

impl SessionController {
    pub fn new(
        settings: SessionSettings,
        audio_factory: AudioSourceFactory,
        recognizer_factory: RecognizerFactory,
        injector: Arc<dyn KeystrokeInjector>,
    ) -> Self {
        Self {
            inner: Mutex::new(ControllerInner {
                state: SessionState::Idle,
                worker: None,
            }),
            settings,
            audio_factory,
            recognizer_factory,
            injector,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.inner.lock().expect("session mutex poisoned").state
    }

    pub fn is_recording(&self) -> bool {
        self.state() == SessionState::Recording
    }

    /// Trigger key pressed: start a recording session unless one is live.
    ///
    /// Key auto-repeat delivers this repeatedly while the key is held, so a
    /// call during `Recording` is a no-op.
    pub fn on_trigger_down(&self) {
        let mut inner = self.inner.lock().expect("session mutex poisoned");
        if inner.state == SessionState::Recording {
            debug!("Trigger held; session already recording");
            return;
        }

        let audio = match (self.audio_factory)() {
            Ok(audio) => audio,
            Err(e) => {
                error!(error = %e, "Failed to start audio capture; staying idle");
                return;
            }
        };
        let recognizer = match (self.recognizer_factory)() {
            Ok(recognizer) => recognizer,
            Err(e) => {
                // Dropping the source releases the capture it just started.
                drop(audio);
                error!(error = %e, "Failed to start recognizer session; staying idle");
                return;
            }
        };

        // A fresh token per session: a worker that overstays its stop
        // deadline keeps seeing its own cancelled token.
        let cancel = CancelToken::new();
        let session_id = Uuid::new_v4();
        let worker = TranscriptionWorker::new(
            session_id,
            audio,
            recognizer,
            Arc::clone(&self.injector),
            TextShaper::new(Arc::clone(&self.settings.commands)),
            self.settings.mode,
            self.settings.pause_delay,
            cancel.clone(),
        );

        let (done_tx, done_rx) = mpsc::channel();
        let join = match thread::Builder::new()
            .name("voxkey-worker".to_string())
            .spawn(move || {
                worker.run();
                let _ = done_tx.send(());
            }) {
            Ok(join) => join,
            Err(e) => {
                error!(error = %e, "Failed to spawn transcription worker; staying idle");
                return;
            }
        };

        inner.worker = Some(WorkerHandle {
            session_id,
            cancel,
            join,
            done: done_rx,
        });
        debug_assert!(inner.state.can_transition_to(SessionState::Recording));
        inner.state = SessionState::Recording;
        info!(session_id = %session_id, "Recording session started");
    }

    /// Trigger key released: stop the recording session, waiting up to the
    /// configured bound for the worker to wind down.
    pub fn on_trigger_up(&self) -> StopOutcome {
        let mut inner = self.inner.lock().expect("session mutex poisoned");
        if inner.state == SessionState::Idle {
            debug!("Trigger released while idle");
            return StopOutcome::AlreadyIdle;
        }

        let outcome = match inner.worker.take() {
            Some(handle) => {
                handle.cancel.cancel();
                match handle.done.recv_timeout(self.settings.stop_timeout) {
                    Ok(()) => {
                        if handle.join.join().is_err() {
                            error!(session_id = %handle.session_id, "Transcription worker panicked");
                        }
                        StopOutcome::Stopped
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        // The worker died without signaling; collect the panic.
                        if handle.join.join().is_err() {
                            error!(session_id = %handle.session_id, "Transcription worker panicked");
                        }
                        StopOutcome::Stopped
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        warn!(
                            session_id = %handle.session_id,
                            timeout_ms = self.settings.stop_timeout.as_millis() as u64,
                            "Worker did not stop within the timeout; returning to idle anyway"
                        );
                        StopOutcome::StoppedAfterTimeout
                    }
                }
            }
            None => StopOutcome::Stopped,
        };

        debug_assert!(inner.state.can_transition_to(SessionState::Idle));
        inner.state = SessionState::Idle;
        info!(?outcome, "Recording session stopped");
        outcome
    }
}

// =============================================================================
// Tests
// =============================================================================
