//! Keystroke text shaping: voice-command substitution, punctuation rules,
//! and inter-word spacing.
//!
//! The shaper never buffers or rewrites text it has already produced; the
//! only state it carries across batches is whether the next regular word
//! needs a leading space.

use std::collections::HashMap;
use std::sync::Arc;

/// Tokens treated as punctuation after substitution: attached to the
/// preceding word, followed by a single space.
fn is_punctuation(token: &str) -> bool {
    matches!(token, "." | "," | "?" | "!" | ":" | ";")
}

/// Turns batches of recognized words into the exact keystroke string to
/// emit, one batch at a time.
///
/// Per word, in order: exact-match command substitution, then punctuation
/// classification of the substituted token, then the spacing rule. A fresh
/// shaper is built for every recording session, so spacing state never
/// leaks across sessions.
pub struct TextShaper {
    commands: Arc<HashMap<String, String>>,
    pending_leading_space: bool,
}

impl TextShaper {
    pub fn new(commands: Arc<HashMap<String, String>>) -> Self {
        Self {
            commands,
            pending_leading_space: false,
        }
    }

    /// Shape one batch of words into its keystroke string.
    pub fn shape(&mut self, batch: &[String]) -> String {
        let mut out = String::new();

        for word in batch {
            let token = self
                .commands
                .get(word)
                .map(String::as_str)
                .unwrap_or(word.as_str());

            if is_punctuation(token) {
                // No space before, one space after; the next word starts flush.
                out.push_str(token);
                out.push(' ');
                self.pending_leading_space = false;
            } else if self.pending_leading_space {
                out.push(' ');
                out.push_str(token);
            } else {
                out.push_str(token);
                self.pending_leading_space = true;
            }
        }

        out
    }
}

// =============================================================================
// Tests
// =============================================================================
