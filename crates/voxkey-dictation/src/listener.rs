//! Trigger-key listening on the OS input layer.
//!
//! With the `listener` feature, a global rdev listener dispatches press and
//! release of the configured trigger key to the session controller. Without
//! it, `run_trigger_listener` is a stub that fails with a clear message.
//!
//! The key-name table matches the names accepted in the configuration file.

use std::fmt;
use std::sync::Arc;

use voxkey_core::error::Result;

#[cfg(not(feature = "listener"))]
use voxkey_core::error::VoxkeyError;

use crate::controller::SessionController;

/// The key whose hold/release drives session start/stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerKey {
    #[default]
    AltRight,
    AltLeft,
    CtrlRight,
    CtrlLeft,
    ShiftRight,
    ShiftLeft,
    ScrollLock,
    Pause,
    Insert,
    Delete,
}

impl TriggerKey {
    /// Parse a configured key name. Names follow the config file
    /// convention ("alt_r", "ctl_l", "scroll_lock", ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "alt_r" => Some(TriggerKey::AltRight),
            "alt_l" => Some(TriggerKey::AltLeft),
            "ctl_r" => Some(TriggerKey::CtrlRight),
            "ctl_l" => Some(TriggerKey::CtrlLeft),
            "shift_r" => Some(TriggerKey::ShiftRight),
            "shift_l" => Some(TriggerKey::ShiftLeft),
            "scroll_lock" => Some(TriggerKey::ScrollLock),
            "pause" => Some(TriggerKey::Pause),
            "insert" => Some(TriggerKey::Insert),
            "delete" => Some(TriggerKey::Delete),
            _ => None,
        }
    }

    /// The configured name for this key.
    pub fn name(&self) -> &'static str {
        match self {
            TriggerKey::AltRight => "alt_r",
            TriggerKey::AltLeft => "alt_l",
            TriggerKey::CtrlRight => "ctl_r",
            TriggerKey::CtrlLeft => "ctl_l",
            TriggerKey::ShiftRight => "shift_r",
            TriggerKey::ShiftLeft => "shift_l",
            TriggerKey::ScrollLock => "scroll_lock",
            TriggerKey::Pause => "pause",
            TriggerKey::Insert => "insert",
            TriggerKey::Delete => "delete",
        }
    }

    #[cfg(feature = "listener")]
    fn to_rdev(self) -> rdev::Key {
        match self {
            TriggerKey::AltRight => rdev::Key::AltGr,
            TriggerKey::AltLeft => rdev::Key::Alt,
            TriggerKey::CtrlRight => rdev::Key::ControlRight,
            TriggerKey::CtrlLeft => rdev::Key::ControlLeft,
            TriggerKey::ShiftRight => rdev::Key::ShiftRight,
            TriggerKey::ShiftLeft => rdev::Key::ShiftLeft,
            TriggerKey::ScrollLock => rdev::Key::ScrollLock,
            TriggerKey::Pause => rdev::Key::Pause,
            TriggerKey::Insert => rdev::Key::Insert,
            TriggerKey::Delete => rdev::Key::Delete,
        }
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Listen for trigger-key transitions and dispatch them to the controller.
///
/// Blocks the calling thread for the life of the process; run it on a
/// dedicated (blocking) thread. All other keys are ignored.
#[cfg(feature = "listener")]
pub fn run_trigger_listener(key: TriggerKey, controller: Arc<SessionController>) -> Result<()> {
    use voxkey_core::error::VoxkeyError;

    let target = key.to_rdev();
    tracing::info!(key = %key, "Trigger-key listener started");

    rdev::listen(move |event| match event.event_type {
        rdev::EventType::KeyPress(k) if k == target => controller.on_trigger_down(),
        rdev::EventType::KeyRelease(k) if k == target => {
            let _ = controller.on_trigger_up();
        }
        _ => {}
    })
    .map_err(|e| VoxkeyError::Dictation(format!("key listener failed: {:?}", e)))
}

/// Stub when the `listener` feature is disabled.
#[cfg(not(feature = "listener"))]
pub fn run_trigger_listener(key: TriggerKey, _controller: Arc<SessionController>) -> Result<()> {
    tracing::warn!(key = %key, "Key listener compiled out");
    Err(VoxkeyError::Dictation(
        "the trigger-key listener requires the `listener` feature".to_string(),
    ))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_round_trips_every_key() {
        for key in [
            TriggerKey::AltRight,
            TriggerKey::AltLeft,
            TriggerKey::CtrlRight,
            TriggerKey::CtrlLeft,
            TriggerKey::ShiftRight,
            TriggerKey::ShiftLeft,
            TriggerKey::ScrollLock,
            TriggerKey::Pause,
            TriggerKey::Insert,
            TriggerKey::Delete,
        ] {
            assert_eq!(TriggerKey::from_name(key.name()), Some(key));
        }
    }

    #[test]
    fn test_from_name_unknown() {
        assert_eq!(TriggerKey::from_name("caps_lock"), None);
        assert_eq!(TriggerKey::from_name(""), None);
        assert_eq!(TriggerKey::from_name("ALT_R"), None);
    }

    #[test]
    fn test_default_trigger_key() {
        assert_eq!(TriggerKey::default(), TriggerKey::AltRight);
        assert_eq!(TriggerKey::default().to_string(), "alt_r");
    }
}
