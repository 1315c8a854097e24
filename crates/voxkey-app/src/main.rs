//! voxkey binary - composition root.
//!
//! Ties the voxkey crates together into the push-to-talk dictation tool:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Verify the audio capture dependency is installed
//! 3. Load the recognition model
//! 4. Wire the session controller (audio + recognizer factories, injector)
//! 5. Run the trigger-key listener until interrupted
//!
//! Startup failures (bad config, missing `arecord`, missing model) exit
//! non-zero before any session logic runs; once running, a single Ctrl+C
//! exits cleanly.

mod cli;

use std::path::PathBuf;

use clap::Parser;

use voxkey_audio::ensure_arecord;
use voxkey_core::config::VoxkeyConfig;
use voxkey_core::error::VoxkeyError;
use voxkey_dictation::TriggerKey;

use cli::CliArgs;

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

/// Expand a leading ~ to the home directory.
fn resolve_model_dir(dir: &str) -> PathBuf {
    if let Some(rest) = dir.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(dir)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config before tracing: the chosen log level may live in the file.
    let config_path = args.resolve_config_path();
    let mut config = match VoxkeyConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(args.log_level.as_deref().unwrap_or("info"));
            tracing::error!(path = %config_path.display(), error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    init_tracing(&args.resolve_log_level(&config.general.log_level));
    tracing::info!(path = %config_path.display(), "Configuration loaded");

    if let Some(ref mode) = args.mode {
        config.dictation.typing_mode = mode.parse().map_err(|e: VoxkeyError| {
            tracing::error!(error = %e, "Invalid typing mode");
            e
        })?;
    }

    if let Err(e) = ensure_arecord() {
        tracing::error!(error = %e, "Startup dependency check failed");
        return Err(e.into());
    }

    let model_name = args.resolve_model(&config.model.default_model);
    let model_path = resolve_model_dir(&config.model.model_dir).join(&model_name);

    let trigger_name = args.resolve_trigger_key(&config.dictation.trigger_key);
    let trigger = TriggerKey::from_name(&trigger_name).unwrap_or_else(|| {
        tracing::warn!(
            key = %trigger_name,
            fallback = %TriggerKey::default(),
            "Unknown trigger key name; using fallback"
        );
        TriggerKey::default()
    });

    run(config, model_name, model_path, trigger).await
}

/// Load the model, wire the controller, and dictate until interrupted.
#[cfg(feature = "vosk")]
async fn run(
    config: VoxkeyConfig,
    model_name: String,
    model_path: PathBuf,
    trigger: TriggerKey,
) -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::Arc;

    use voxkey_audio::{ArecordSource, AudioSource};
    use voxkey_core::types::{TypingMode, SAMPLE_RATE};
    use voxkey_dictation::{
        run_trigger_listener, AudioSourceFactory, EnigoInjector, RecognizerFactory,
        SessionController, SessionSettings,
    };
    use voxkey_stt::{ModelHandle, RecognizerSession};

    let model = match ModelHandle::load(&model_path) {
        Ok(model) => model,
        Err(e) => {
            tracing::error!(path = %model_path.display(), error = %e, "Model load failed");
            return Err(e.into());
        }
    };

    let injector = Arc::new(EnigoInjector::new()?);
    let settings = SessionSettings::from_config(&config);

    let audio_factory: AudioSourceFactory =
        Box::new(|| ArecordSource::spawn().map(|s| Box::new(s) as Box<dyn AudioSource>));
    let recognizer_factory: RecognizerFactory = Box::new(move || {
        model
            .new_session(SAMPLE_RATE as f32)
            .map(|s| Box::new(s) as Box<dyn RecognizerSession>)
    });

    let controller = Arc::new(SessionController::new(
        settings,
        audio_factory,
        recognizer_factory,
        injector,
    ));

    tracing::info!(model = %model_name, "voxkey running");
    tracing::info!(key = %trigger, "Hold the trigger key to record");
    if config.dictation.typing_mode == TypingMode::Buffered
        && config.dictation.pause_delay_secs > 0.0
    {
        tracing::info!(
            mode = %config.dictation.typing_mode,
            pause_delay_secs = config.dictation.pause_delay_secs,
            "Typing mode"
        );
    } else {
        tracing::info!(mode = %config.dictation.typing_mode, "Typing mode");
    }
    tracing::info!("Press Ctrl+C to exit");

    // rdev's listen loop never returns in normal operation; give it a
    // blocking thread of its own.
    let listener_controller = Arc::clone(&controller);
    tokio::task::spawn_blocking(move || {
        if let Err(e) = run_trigger_listener(trigger, listener_controller) {
            tracing::error!(error = %e, "Trigger-key listener exited");
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Interrupt received; exiting");
    Ok(())
}

/// Stub when the build carries no speech engine.
#[cfg(not(feature = "vosk"))]
async fn run(
    _config: VoxkeyConfig,
    _model_name: String,
    _model_path: PathBuf,
    _trigger: TriggerKey,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::error!(
        "This build has no speech engine; rebuild with --features full (or --features vosk)"
    );
    Err(VoxkeyError::Recognition("speech engine not compiled in".to_string()).into())
}
