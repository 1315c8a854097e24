//! One recording session end-to-end: audio chunks in, keystrokes out.
//!
//! The worker owns its audio source and recognizer session for the whole
//! recording, loops until the stream ends or a stop is requested, and
//! always drains the engine's trailing result before releasing the audio
//! source — speech captured up to the stop point is never dropped.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use voxkey_audio::AudioSource;
use voxkey_core::types::TypingMode;
use voxkey_stt::{RecognizerEvent, RecognizerSession};

use crate::cancel::CancelToken;
use crate::inject::KeystrokeInjector;
use crate::shaper::TextShaper;

/// Runs one complete recording session on its own thread.
///
/// Realtime mode diffs each hypothesis against the words already typed for
/// the current phrase. This assumes the engine only extends prior partial
/// hypotheses; if it revises an already-announced word, the superseded word
/// stays typed — emitted keystrokes are never corrected.
pub struct TranscriptionWorker {
    session_id: Uuid,
    audio: Box<dyn AudioSource>,
    recognizer: Box<dyn RecognizerSession>,
    injector: Arc<dyn KeystrokeInjector>,
    shaper: TextShaper,
    mode: TypingMode,
    pause_delay: Duration,
    cancel: CancelToken,
}

impl TranscriptionWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: Uuid,
        audio: Box<dyn AudioSource>,
        recognizer: Box<dyn RecognizerSession>,
        injector: Arc<dyn KeystrokeInjector>,
        shaper: TextShaper,
        mode: TypingMode,
        pause_delay: Duration,
        cancel: CancelToken,
    ) -> Self {
        Self {
            session_id,
            audio,
            recognizer,
            injector,
            shaper,
            mode,
            pause_delay,
            cancel,
        }
    }

    /// Run the session to completion. Consumes the worker; all failures are
    /// contained here and surfaced via logging.
    pub fn run(mut self) {
        let started = Utc::now();
        debug!(session_id = %self.session_id, mode = %self.mode, "Transcription worker started");

        // Words already typed from the in-progress phrase (realtime mode).
        let mut partial_cursor: Vec<String> = Vec::new();

        loop {
            if self.cancel.is_cancelled() {
                debug!(session_id = %self.session_id, "Stop requested");
                break;
            }

            let chunk = match self.audio.next_chunk() {
                Ok(Some(chunk)) => chunk,
                Ok(None) => {
                    debug!(session_id = %self.session_id, "Audio stream ended");
                    break;
                }
                Err(e) => {
                    warn!(session_id = %self.session_id, error = %e, "Audio capture failed; ending session early");
                    break;
                }
            };

            match self.recognizer.feed(&chunk) {
                Ok(RecognizerEvent::Final(words)) => {
                    if words.is_empty() {
                        continue;
                    }
                    match self.mode {
                        TypingMode::Buffered => {
                            // Let the engine settle before committing the
                            // phrase to keystrokes.
                            if self.pause_delay > Duration::ZERO {
                                thread::sleep(self.pause_delay);
                            }
                            self.emit(&words);
                        }
                        TypingMode::Realtime => {
                            let new = new_words(&words, &partial_cursor);
                            if !new.is_empty() {
                                self.emit(new);
                            }
                        }
                    }
                    // A completed phrase starts the next phrase's cursor fresh.
                    partial_cursor.clear();
                }
                Ok(RecognizerEvent::Partial(words)) => {
                    if self.mode == TypingMode::Realtime {
                        let new = new_words(&words, &partial_cursor);
                        if !new.is_empty() {
                            self.emit(new);
                            partial_cursor = words;
                        }
                    }
                    // Buffered mode never types intermediate hypotheses.
                }
                Ok(RecognizerEvent::NoResult) => {}
                Err(e) => {
                    warn!(session_id = %self.session_id, error = %e, "Chunk not decoded; continuing");
                }
            }
        }

        // Drain whatever the engine still buffers for audio captured up to
        // the stop point.
        match self.recognizer.flush() {
            Ok(words) if !words.is_empty() => match self.mode {
                TypingMode::Buffered => self.emit(&words),
                TypingMode::Realtime => {
                    let new = new_words(&words, &partial_cursor);
                    if !new.is_empty() {
                        self.emit(new);
                    }
                }
            },
            Ok(_) => {}
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "Failed to read trailing result");
            }
        }

        self.audio.terminate();

        let elapsed = (Utc::now() - started).num_milliseconds();
        info!(session_id = %self.session_id, elapsed_ms = elapsed, "Transcription worker finished");
    }

    fn emit(&mut self, words: &[String]) {
        let text = self.shaper.shape(words);
        if text.is_empty() {
            return;
        }
        if let Err(e) = self.injector.inject(&text) {
            warn!(session_id = %self.session_id, error = %e, "Keystroke injection failed");
        }
    }
}

/// The suffix of `words` not yet covered by the cursor. A hypothesis
/// shorter than the cursor yields an empty suffix rather than panicking.
fn new_words<'a>(words: &'a [String], cursor: &[String]) -> &'a [String] {
    words.get(cursor.len()..).unwrap_or(&[])
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use voxkey_audio::{failing_audio_source, ScriptedAudioSource};
    use voxkey_core::error::VoxkeyError;
    use voxkey_stt::{words, RecognizerEvent, ScriptedRecognizer};

    use crate::inject::MockInjector;

    fn shaper() -> TextShaper {
        TextShaper::new(Arc::new(HashMap::new()))
    }

    fn shaper_with(commands: &[(&str, &str)]) -> TextShaper {
        let map: HashMap<String, String> = commands
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TextShaper::new(Arc::new(map))
    }

    fn chunks(n: usize) -> Vec<Vec<i16>> {
        vec![vec![0i16; 8]; n]
    }

    fn run_worker(
        audio: ScriptedAudioSource,
        recognizer: ScriptedRecognizer,
        shaper: TextShaper,
        mode: TypingMode,
        pause_delay: Duration,
        cancel: CancelToken,
    ) -> MockInjector {
        let injector = MockInjector::new();
        let worker = TranscriptionWorker::new(
            Uuid::new_v4(),
            Box::new(audio),
            Box::new(recognizer),
            Arc::new(injector.clone()),
            shaper,
            mode,
            pause_delay,
            cancel,
        );
        worker.run();
        injector
    }

    #[test]
    fn test_buffered_types_whole_finals_and_ignores_partials() {
        let recognizer = ScriptedRecognizer::new(
            vec![
                Ok(RecognizerEvent::Partial(words(&["hello"]))),
                Ok(RecognizerEvent::Partial(words(&["hello", "world"]))),
                Ok(RecognizerEvent::Final(words(&["hello", "world"]))),
            ],
            Vec::new(),
        );
        let injector = run_worker(
            ScriptedAudioSource::new(chunks(3)),
            recognizer,
            shaper(),
            TypingMode::Buffered,
            Duration::ZERO,
            CancelToken::new(),
        );

        assert_eq!(injector.batches(), vec!["hello world"]);
    }

    #[test]
    fn test_buffered_scenario_with_command_substitution() {
        let recognizer = ScriptedRecognizer::new(
            vec![Ok(RecognizerEvent::Final(words(&[
                "hello", "world", "period", "new", "line",
            ])))],
            Vec::new(),
        );
        let injector = run_worker(
            ScriptedAudioSource::new(chunks(1)),
            recognizer,
            shaper_with(&[("period", ".")]),
            TypingMode::Buffered,
            Duration::ZERO,
            CancelToken::new(),
        );

        assert_eq!(injector.text(), "hello world. new line");
    }

    #[test]
    fn test_buffered_skips_empty_finals() {
        let recognizer = ScriptedRecognizer::new(
            vec![
                Ok(RecognizerEvent::Final(Vec::new())),
                Ok(RecognizerEvent::Final(words(&["ok"]))),
            ],
            Vec::new(),
        );
        let injector = run_worker(
            ScriptedAudioSource::new(chunks(2)),
            recognizer,
            shaper(),
            TypingMode::Buffered,
            Duration::ZERO,
            CancelToken::new(),
        );

        assert_eq!(injector.batches(), vec!["ok"]);
    }

    #[test]
    fn test_buffered_applies_pause_delay_per_final() {
        let recognizer = ScriptedRecognizer::new(
            vec![Ok(RecognizerEvent::Final(words(&["slow"])))],
            Vec::new(),
        );
        let start = std::time::Instant::now();
        let injector = run_worker(
            ScriptedAudioSource::new(chunks(1)),
            recognizer,
            shaper(),
            TypingMode::Buffered,
            Duration::from_millis(30),
            CancelToken::new(),
        );

        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(injector.batches(), vec!["slow"]);
    }

    #[test]
    fn test_realtime_types_growing_partials_incrementally() {
        let recognizer = ScriptedRecognizer::new(
            vec![
                Ok(RecognizerEvent::Partial(words(&["turn"]))),
                Ok(RecognizerEvent::Partial(words(&["turn", "on"]))),
                Ok(RecognizerEvent::Final(words(&["turn", "on", "the", "lights"]))),
            ],
            Vec::new(),
        );
        let injector = run_worker(
            ScriptedAudioSource::new(chunks(3)),
            recognizer,
            shaper(),
            TypingMode::Realtime,
            Duration::ZERO,
            CancelToken::new(),
        );

        assert_eq!(injector.batches(), vec!["turn", " on", " the lights"]);
        assert_eq!(injector.text(), "turn on the lights");
    }

    #[test]
    fn test_realtime_repeated_partial_types_nothing_new() {
        let recognizer = ScriptedRecognizer::new(
            vec![
                Ok(RecognizerEvent::Partial(words(&["hi"]))),
                Ok(RecognizerEvent::Partial(words(&["hi"]))),
                Ok(RecognizerEvent::Partial(words(&["hi"]))),
            ],
            Vec::new(),
        );
        let injector = run_worker(
            ScriptedAudioSource::new(chunks(3)),
            recognizer,
            shaper(),
            TypingMode::Realtime,
            Duration::ZERO,
            CancelToken::new(),
        );

        assert_eq!(injector.batches(), vec!["hi"]);
    }

    #[test]
    fn test_realtime_final_resets_cursor_for_next_phrase() {
        let recognizer = ScriptedRecognizer::new(
            vec![
                Ok(RecognizerEvent::Partial(words(&["one"]))),
                Ok(RecognizerEvent::Final(words(&["one"]))),
                Ok(RecognizerEvent::Partial(words(&["two"]))),
                Ok(RecognizerEvent::Final(words(&["two"]))),
            ],
            Vec::new(),
        );
        let injector = run_worker(
            ScriptedAudioSource::new(chunks(4)),
            recognizer,
            shaper(),
            TypingMode::Realtime,
            Duration::ZERO,
            CancelToken::new(),
        );

        // Each phrase typed exactly once, no duplicates from its final.
        assert_eq!(injector.text(), "one two");
    }

    #[test]
    fn test_realtime_final_shorter_than_cursor_is_harmless() {
        // An engine revising downward must not panic or retype anything.
        let recognizer = ScriptedRecognizer::new(
            vec![
                Ok(RecognizerEvent::Partial(words(&["aa", "bb", "cc"]))),
                Ok(RecognizerEvent::Final(words(&["aa"]))),
            ],
            Vec::new(),
        );
        let injector = run_worker(
            ScriptedAudioSource::new(chunks(2)),
            recognizer,
            shaper(),
            TypingMode::Realtime,
            Duration::ZERO,
            CancelToken::new(),
        );

        assert_eq!(injector.text(), "aa bb cc");
    }

    #[test]
    fn test_flush_types_trailing_words_after_end_of_stream() {
        // Stream ends with a partial typed but no final; the flush result
        // must be typed exactly once.
        let recognizer = ScriptedRecognizer::new(
            vec![Ok(RecognizerEvent::Partial(words(&["left", "over"])))],
            words(&["left", "over", "words"]),
        );
        let injector = run_worker(
            ScriptedAudioSource::new(chunks(1)),
            recognizer,
            shaper(),
            TypingMode::Realtime,
            Duration::ZERO,
            CancelToken::new(),
        );

        assert_eq!(injector.batches(), vec!["left over", " words"]);
        assert_eq!(injector.text(), "left over words");
    }

    #[test]
    fn test_flush_in_buffered_mode_types_everything() {
        let recognizer = ScriptedRecognizer::new(
            vec![Ok(RecognizerEvent::Partial(words(&["pending"])))],
            words(&["pending", "phrase"]),
        );
        let injector = run_worker(
            ScriptedAudioSource::new(chunks(1)),
            recognizer,
            shaper(),
            TypingMode::Buffered,
            Duration::ZERO,
            CancelToken::new(),
        );

        assert_eq!(injector.batches(), vec!["pending phrase"]);
    }

    #[test]
    fn test_decode_error_continues_session() {
        let recognizer = ScriptedRecognizer::new(
            vec![
                Err(VoxkeyError::Recognition("garbled".to_string())),
                Ok(RecognizerEvent::Final(words(&["fine"]))),
            ],
            Vec::new(),
        );
        let injector = run_worker(
            ScriptedAudioSource::new(chunks(2)),
            recognizer,
            shaper(),
            TypingMode::Buffered,
            Duration::ZERO,
            CancelToken::new(),
        );

        assert_eq!(injector.batches(), vec!["fine"]);
    }

    #[test]
    fn test_audio_error_still_flushes_and_releases() {
        let audio = failing_audio_source("capture died");
        let terminated = audio.terminated_flag();
        let recognizer = ScriptedRecognizer::new(Vec::new(), words(&["salvaged"]));

        let injector = run_worker(
            audio,
            recognizer,
            shaper(),
            TypingMode::Buffered,
            Duration::ZERO,
            CancelToken::new(),
        );

        assert_eq!(injector.batches(), vec!["salvaged"]);
        assert!(terminated.load(std::sync::atomic::Ordering::Relaxed));
    }

    #[test]
    fn test_cancelled_before_start_only_flushes() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let recognizer = ScriptedRecognizer::new(
            vec![Ok(RecognizerEvent::Final(words(&["never", "read"])))],
            words(&["tail"]),
        );
        let audio = ScriptedAudioSource::new(chunks(4));
        let terminated = audio.terminated_flag();

        let injector = run_worker(
            audio,
            recognizer,
            shaper(),
            TypingMode::Buffered,
            Duration::ZERO,
            cancel,
        );

        assert_eq!(injector.batches(), vec!["tail"]);
        assert!(terminated.load(std::sync::atomic::Ordering::Relaxed));
    }

    #[test]
    fn test_source_released_on_normal_end() {
        let audio = ScriptedAudioSource::new(chunks(1));
        let terminated = audio.terminated_flag();

        run_worker(
            audio,
            ScriptedRecognizer::silent(),
            shaper(),
            TypingMode::Buffered,
            Duration::ZERO,
            CancelToken::new(),
        );

        assert!(terminated.load(std::sync::atomic::Ordering::Relaxed));
    }
}
