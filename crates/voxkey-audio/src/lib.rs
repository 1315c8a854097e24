//! voxkey Audio crate - capture-subprocess management and the audio source
//! abstraction the transcription worker reads from.
//!
//! Provides the blocking `AudioSource` trait, the real `arecord`-backed
//! implementation, and a scripted implementation for testing without a
//! microphone.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use voxkey_core::error::{Result, VoxkeyError};

pub mod arecord;

pub use arecord::{arecord_available, ensure_arecord, ArecordSource};

/// Bytes read from the capture stream per chunk: 2000 mono S16LE samples,
/// about 125 ms at 16 kHz. Stop requests are only noticed between chunks,
/// so this also bounds the cancellation latency.
pub const CHUNK_BYTES: usize = 4000;

/// A blocking source of raw PCM audio chunks.
///
/// One source instance backs exactly one recording session. `next_chunk`
/// blocks until a chunk is available, the stream ends, or the source fails;
/// `terminate` must stop the underlying capture promptly and is idempotent.
pub trait AudioSource: Send {
    /// Read the next chunk of mono 16-bit samples.
    ///
    /// Returns `Ok(None)` once the stream has ended.
    fn next_chunk(&mut self) -> Result<Option<Vec<i16>>>;

    /// Stop the underlying capture. Called on every session exit path.
    fn terminate(&mut self);
}

// =============================================================================
// Scripted implementation
// =============================================================================

/// Scripted audio source for testing.
///
/// Replays a fixed queue of chunk outcomes, then reports end-of-stream.
/// The `terminated` flag is shared so tests can assert the source was
/// released after the session ends; an optional tail delay makes the final
/// read block, which is how stop-timeout behavior is exercised.
pub struct ScriptedAudioSource {
    chunks: VecDeque<Result<Vec<i16>>>,
    tail_delay: Option<Duration>,
    terminated: Arc<AtomicBool>,
}

impl ScriptedAudioSource {
    /// Source that yields the given chunks in order, then end-of-stream.
    pub fn new(chunks: Vec<Vec<i16>>) -> Self {
        Self {
            chunks: chunks.into_iter().map(Ok).collect(),
            tail_delay: None,
            terminated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Source that replays arbitrary read outcomes, errors included.
    pub fn with_outcomes(outcomes: Vec<Result<Vec<i16>>>) -> Self {
        Self {
            chunks: outcomes.into_iter().collect(),
            tail_delay: None,
            terminated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Block for `delay` on the read after the queue is exhausted, before
    /// reporting end-of-stream.
    pub fn with_tail_delay(mut self, delay: Duration) -> Self {
        self.tail_delay = Some(delay);
        self
    }

    /// Shared flag that flips once `terminate` has been called.
    pub fn terminated_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminated)
    }
}

impl AudioSource for ScriptedAudioSource {
    fn next_chunk(&mut self) -> Result<Option<Vec<i16>>> {
        match self.chunks.pop_front() {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(e)) => Err(e),
            None => {
                if let Some(delay) = self.tail_delay.take() {
                    std::thread::sleep(delay);
                }
                Ok(None)
            }
        }
    }

    fn terminate(&mut self) {
        self.terminated.store(true, Ordering::Relaxed);
    }
}

/// Convenience constructor for a source that fails on its first read.
pub fn failing_audio_source(message: &str) -> ScriptedAudioSource {
    ScriptedAudioSource::with_outcomes(vec![Err(VoxkeyError::AudioStream(message.to_string()))])
}

// =============================================================================
// Tests
// =============================================================================
