use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, VoxkeyError};
use crate::types::TypingMode;

/// Top-level configuration for the voxkey application.
///
/// Loaded from `~/.voxkey/config.toml` by default. Each section corresponds
/// to one concern; every field has a default so a partial (or absent) file
/// is fine, while a present-but-malformed file is a startup error.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VoxkeyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub dictation: DictationConfig,
    #[serde(default)]
    pub model: ModelConfig,
    /// Voice-command substitutions: recognized word -> replacement string
    /// (e.g. `period = "."`). Applied before punctuation classification.
    #[serde(default)]
    pub commands: HashMap<String, String>,
}

impl VoxkeyConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VoxkeyConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults only
    /// when the file does not exist. A file that exists but fails to parse
    /// is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            info!(
                "No config file at {}; using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VoxkeyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values no session could run with.
    pub fn validate(&self) -> Result<()> {
        if self.dictation.pause_delay_secs < 0.0 {
            return Err(VoxkeyError::Config(format!(
                "pause_delay_secs must be >= 0 (got {})",
                self.dictation.pause_delay_secs
            )));
        }
        if !self.dictation.pause_delay_secs.is_finite() {
            return Err(VoxkeyError::Config(
                "pause_delay_secs must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Push-to-talk dictation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictationConfig {
    /// Trigger key name (e.g. "alt_r", "scroll_lock").
    pub trigger_key: String,
    /// Typing mode: buffered or realtime.
    pub typing_mode: TypingMode,
    /// Settling delay before a finalized phrase is typed in buffered mode,
    /// in seconds. Zero disables the delay.
    pub pause_delay_secs: f64,
    /// How long trigger-release waits for the recording session to wind
    /// down before returning to idle anyway, in milliseconds.
    pub stop_timeout_ms: u64,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            trigger_key: "alt_r".to_string(),
            typing_mode: TypingMode::Buffered,
            pause_delay_secs: 0.3,
            stop_timeout_ms: 1000,
        }
    }
}

/// Recognition model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model directory name loaded when none is given on the command line.
    pub default_model: String,
    /// Directory the model directories live in.
    pub model_dir: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default_model: "vosk-model-small-en-us-0.15".to_string(),
            model_dir: "~/.voxkey/models".to_string(),
        }
    }
}
