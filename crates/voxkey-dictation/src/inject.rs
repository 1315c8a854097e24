//! Keystroke injection into the focused application.
//!
//! With the `inject` feature, text is synthesized as OS input events via
//! enigo. Without it, the injector is a stub that fails loudly; the worker
//! logs the failure and carries on, so a stub build still exercises the
//! whole session pipeline.

use std::sync::{Arc, Mutex};

use voxkey_core::error::{Result, VoxkeyError};

#[cfg(not(feature = "inject"))]
use tracing::warn;

/// Synthesizes key events for a shaped text string at the OS input layer.
///
/// Injection is synchronous and ordered: a call returns only once the whole
/// string has been handed to the OS, so batches never interleave.
pub trait KeystrokeInjector: Send + Sync {
    fn inject(&self, text: &str) -> Result<()>;
}

// =============================================================================
// Real implementation (inject feature)
// =============================================================================

/// Keystroke injector backed by enigo.
#[cfg(feature = "inject")]
pub struct EnigoInjector {
    // enigo holds a platform connection and is not Sync on its own.
    enigo: Mutex<enigo::Enigo>,
}

#[cfg(feature = "inject")]
impl EnigoInjector {
    pub fn new() -> Result<Self> {
        use enigo::{Enigo, Settings};

        let enigo = Enigo::new(&Settings::default()).map_err(|e| {
            VoxkeyError::Dictation(format!("failed to initialize keystroke injection: {}", e))
        })?;
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }
}

#[cfg(feature = "inject")]
impl KeystrokeInjector for EnigoInjector {
    fn inject(&self, text: &str) -> Result<()> {
        use enigo::Keyboard;

        if text.is_empty() {
            return Ok(());
        }

        let mut enigo = self
            .enigo
            .lock()
            .map_err(|_| VoxkeyError::Dictation("injector mutex poisoned".to_string()))?;
        enigo.text(text).map_err(|e| {
            VoxkeyError::Dictation(format!("failed to inject keystrokes: {}", e))
        })?;

        tracing::debug!(chars = text.len(), "Keystrokes injected");
        Ok(())
    }
}

// =============================================================================
// Stub implementation (inject feature disabled)
// =============================================================================

/// Stub injector used when the `inject` feature is disabled.
#[cfg(not(feature = "inject"))]
pub struct EnigoInjector;

#[cfg(not(feature = "inject"))]
impl EnigoInjector {
    pub fn new() -> Result<Self> {
        warn!("Keystroke injection compiled out; recognized text will be dropped");
        Ok(Self)
    }
}

#[cfg(not(feature = "inject"))]
impl KeystrokeInjector for EnigoInjector {
    fn inject(&self, text: &str) -> Result<()> {
        warn!(
            chars = text.len(),
            "Keystroke injection requires the `inject` feature"
        );
        Err(VoxkeyError::Dictation(
            "keystroke injection requires the `inject` feature".to_string(),
        ))
    }
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Records every emitted batch instead of typing it; for tests.
#[derive(Debug, Clone, Default)]
pub struct MockInjector {
    batches: Arc<Mutex<Vec<String>>>,
}

impl MockInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every batch emitted so far, in order.
    pub fn batches(&self) -> Vec<String> {
        self.batches.lock().expect("mock injector mutex poisoned").clone()
    }

    /// All emitted batches concatenated: the text a user would see.
    pub fn text(&self) -> String {
        self.batches().concat()
    }
}

impl KeystrokeInjector for MockInjector {
    fn inject(&self, text: &str) -> Result<()> {
        self.batches
            .lock()
            .expect("mock injector mutex poisoned")
            .push(text.to_string());
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
