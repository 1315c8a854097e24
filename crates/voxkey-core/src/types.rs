use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VoxkeyError;

/// Sample rate the capture process records at and the recognizer is
/// constructed with: mono, 16-bit signed little-endian, 16 kHz.
pub const SAMPLE_RATE: u32 = 16_000;

/// How recognized words are turned into keystrokes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypingMode {
    /// Only finalized phrases are typed, as whole units, optionally after a
    /// settling delay.
    #[default]
    Buffered,
    /// Newly-appeared words are typed as soon as they show up in partial or
    /// final results.
    Realtime,
}

impl fmt::Display for TypingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypingMode::Buffered => write!(f, "buffered"),
            TypingMode::Realtime => write!(f, "realtime"),
        }
    }
}

impl FromStr for TypingMode {
    type Err = VoxkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buffered" => Ok(TypingMode::Buffered),
            "realtime" => Ok(TypingMode::Realtime),
            other => Err(VoxkeyError::Config(format!(
                "unknown typing mode '{}' (expected 'buffered' or 'realtime')",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_mode_display() {
        assert_eq!(TypingMode::Buffered.to_string(), "buffered");
        assert_eq!(TypingMode::Realtime.to_string(), "realtime");
    }

    #[test]
    fn test_typing_mode_from_str() {
        assert_eq!("buffered".parse::<TypingMode>().unwrap(), TypingMode::Buffered);
        assert_eq!("realtime".parse::<TypingMode>().unwrap(), TypingMode::Realtime);
        assert!("streaming".parse::<TypingMode>().is_err());
    }

    #[test]
    fn test_typing_mode_default_is_buffered() {
        assert_eq!(TypingMode::default(), TypingMode::Buffered);
    }

    #[test]
    fn test_typing_mode_serde_roundtrip() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            mode: TypingMode,
        }

        let wrapper: Wrapper = toml::from_str("mode = \"realtime\"").unwrap();
        assert_eq!(wrapper.mode, TypingMode::Realtime);

        let serialized = toml::to_string(&Wrapper {
            mode: TypingMode::Buffered,
        })
        .unwrap();
        assert!(serialized.contains("buffered"));
    }
}
