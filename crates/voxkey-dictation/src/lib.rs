//! voxkey Dictation crate - push-to-talk session lifecycle, typing
//! strategies, and text shaping.
//!
//! A `SessionController` reacts to trigger-key transitions: key-down spawns
//! one `TranscriptionWorker` that streams audio through a recognizer session
//! and emits recognized words as keystrokes; key-up cancels it cooperatively
//! and waits (bounded) for it to wind down. Sessions are strictly
//! sequential — a new worker never starts before the previous one stopped.

pub mod cancel;
pub mod controller;
pub mod inject;
pub mod listener;
pub mod shaper;
pub mod state;
pub mod worker;

pub use cancel::CancelToken;
pub use controller::{
    AudioSourceFactory, RecognizerFactory, SessionController, SessionSettings, StopOutcome,
};
pub use inject::{EnigoInjector, KeystrokeInjector, MockInjector};
pub use listener::{run_trigger_listener, TriggerKey};
pub use shaper::TextShaper;
pub use state::SessionState;
pub use worker::TranscriptionWorker;
