use thiserror::Error;

/// Top-level error type for the voxkey system.
///
/// Startup-phase variants (`Config`, `DependencyMissing`, `ModelLoad`) are
/// fatal and printed with a human-readable message before the process exits
/// non-zero. In-session variants (`AudioStream`, `Recognition`, `Dictation`)
/// are absorbed inside the recording session and surfaced via logging; they
/// never reach the key-event thread.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VoxkeyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing dependency: {name} ({hint})")]
    DependencyMissing { name: String, hint: String },

    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Audio stream error: {0}")]
    AudioStream(String),

    #[error("Recognition error: {0}")]
    Recognition(String),

    #[error("Dictation error: {0}")]
    Dictation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for VoxkeyError {
    fn from(err: toml::de::Error) -> Self {
        VoxkeyError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for VoxkeyError {
    fn from(err: toml::ser::Error) -> Self {
        VoxkeyError::Config(err.to_string())
    }
}

/// A specialized `Result` type for voxkey operations.
pub type Result<T> = std::result::Result<T, VoxkeyError>;
