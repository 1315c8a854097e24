//! voxkey STT crate - streaming recognizer session abstraction over the
//! speech engine.
//!
//! The transcription worker feeds raw PCM chunks into a `RecognizerSession`
//! and reacts to the per-chunk event: a finalized phrase, an intermediate
//! hypothesis, or nothing yet. A scripted implementation is provided for
//! testing without a real engine; the Vosk-backed implementation lives in
//! `vosk_engine` behind the `vosk` feature.

use std::collections::VecDeque;

use voxkey_core::error::Result;

#[cfg(feature = "vosk")]
pub mod vosk_engine;

#[cfg(feature = "vosk")]
pub use vosk_engine::{ModelHandle, VoskSession};

/// What the engine produced for one fed chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    /// A phrase boundary was detected; these are the phrase's words.
    Final(Vec<String>),
    /// An intermediate hypothesis for in-progress speech.
    Partial(Vec<String>),
    /// Nothing to report for this chunk.
    NoResult,
}

/// One streaming recognition session over a loaded model.
///
/// A session lives exactly as long as one recording session. `feed` pushes
/// one audio chunk; `flush` drains whatever the engine still buffers once
/// the audio stream has ended.
pub trait RecognizerSession: Send {
    /// Feed one chunk of mono 16-bit samples.
    fn feed(&mut self, samples: &[i16]) -> Result<RecognizerEvent>;

    /// Retrieve the trailing result buffered in the engine, if any.
    fn flush(&mut self) -> Result<Vec<String>>;
}

/// Split engine text into a word batch.
pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

// =============================================================================
// Scripted implementation
// =============================================================================

/// Scripted recognizer session for testing.
///
/// Replays a fixed sequence of per-chunk outcomes (one per `feed` call,
/// `NoResult` once exhausted) and a fixed flush result.
pub struct ScriptedRecognizer {
    events: VecDeque<Result<RecognizerEvent>>,
    flush_words: Vec<String>,
}

impl ScriptedRecognizer {
    pub fn new(events: Vec<Result<RecognizerEvent>>, flush_words: Vec<String>) -> Self {
        Self {
            events: events.into_iter().collect(),
            flush_words,
        }
    }

    /// Session that never produces anything.
    pub fn silent() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl RecognizerSession for ScriptedRecognizer {
    fn feed(&mut self, _samples: &[i16]) -> Result<RecognizerEvent> {
        self.events
            .pop_front()
            .unwrap_or(Ok(RecognizerEvent::NoResult))
    }

    fn flush(&mut self) -> Result<Vec<String>> {
        Ok(std::mem::take(&mut self.flush_words))
    }
}

/// Build an owned word list from string literals; test convenience.
pub fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|w| w.to_string()).collect()
}

// =============================================================================
// Tests
// =============================================================================
