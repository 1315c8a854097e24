//! Vosk-backed recognizer session (requires the `vosk` feature and the
//! libvosk shared library at runtime).
//!
//! One `ModelHandle` is loaded at startup and shared across recording
//! sessions; each session gets its own `vosk::Recognizer`, which streams
//! chunks and reports phrase boundaries itself.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};
use vosk::{DecodingState, Model, Recognizer};

use voxkey_core::error::{Result, VoxkeyError};

use crate::{split_words, RecognizerEvent, RecognizerSession};

/// A loaded recognition model, shared across recording sessions.
#[derive(Clone)]
pub struct ModelHandle {
    model: Arc<Model>,
}

impl ModelHandle {
    /// Load a model from its directory on disk.
    ///
    /// # Errors
    /// Returns `VoxkeyError::ModelLoad` if the path does not exist or the
    /// engine rejects its contents.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VoxkeyError::ModelLoad(format!(
                "model not found at {}",
                path.display()
            )));
        }

        info!(path = %path.display(), "Loading recognition model");
        let model = Model::new(path.to_string_lossy()).ok_or_else(|| {
            VoxkeyError::ModelLoad(format!("failed to load model from {}", path.display()))
        })?;
        info!("Recognition model loaded");

        Ok(Self {
            model: Arc::new(model),
        })
    }

    /// Start a fresh streaming session at the given sample rate.
    pub fn new_session(&self, sample_rate: f32) -> Result<VoskSession> {
        let recognizer = Recognizer::new(&self.model, sample_rate).ok_or_else(|| {
            VoxkeyError::Recognition(format!(
                "failed to create recognizer at {} Hz",
                sample_rate
            ))
        })?;
        debug!(sample_rate, "Recognizer session created");
        Ok(VoskSession { recognizer })
    }
}

/// One live streaming recognition session.
pub struct VoskSession {
    recognizer: Recognizer,
}

impl RecognizerSession for VoskSession {
    fn feed(&mut self, samples: &[i16]) -> Result<RecognizerEvent> {
        match self.recognizer.accept_waveform(samples) {
            DecodingState::Finalized => {
                let text = self
                    .recognizer
                    .result()
                    .single()
                    .map(|r| r.text.to_string())
                    .unwrap_or_default();
                Ok(RecognizerEvent::Final(split_words(&text)))
            }
            DecodingState::Running => {
                let partial = self.recognizer.partial_result().partial.to_string();
                if partial.is_empty() {
                    Ok(RecognizerEvent::NoResult)
                } else {
                    Ok(RecognizerEvent::Partial(split_words(&partial)))
                }
            }
            DecodingState::Failed => Err(VoxkeyError::Recognition(
                "engine failed to decode chunk".to_string(),
            )),
        }
    }

    fn flush(&mut self) -> Result<Vec<String>> {
        let text = self
            .recognizer
            .final_result()
            .single()
            .map(|r| r.text.to_string())
            .unwrap_or_default();
        Ok(split_words(&text))
    }
}

// =============================================================================
// Tests
// =============================================================================
