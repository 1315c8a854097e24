//! CLI argument definitions for the voxkey binary.
//!
//! Uses `clap` with derive macros. Priority resolution:
//! CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// voxkey — hold a key, speak, and the words are typed at your cursor.
#[derive(Parser, Debug)]
#[command(name = "voxkey", version, about)]
pub struct CliArgs {
    /// Recognition model directory name (overrides the configured default).
    pub model: Option<String>,

    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Trigger key name (e.g. alt_r, scroll_lock).
    #[arg(short = 'k', long = "trigger-key")]
    pub trigger_key: Option<String>,

    /// Typing mode: buffered or realtime.
    #[arg(short = 'm', long = "mode")]
    pub mode: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > VOXKEY_CONFIG env var > ~/.voxkey/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("VOXKEY_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the trigger key name.
    ///
    /// Priority: --trigger-key flag > TRIGGER_KEY env var > config file value.
    pub fn resolve_trigger_key(&self, config_key: &str) -> String {
        if let Some(ref k) = self.trigger_key {
            return k.clone();
        }
        if let Ok(k) = std::env::var("TRIGGER_KEY") {
            if !k.is_empty() {
                return k;
            }
        }
        config_key.to_string()
    }

    /// Resolve the model directory name.
    ///
    /// Priority: positional argument > config file value.
    pub fn resolve_model(&self, config_model: &str) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| config_model.to_string())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path (~/.voxkey/config.toml).
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".voxkey").join("config.toml");
    }
    PathBuf::from("config.toml")
}
