//! Raw PCM capture via an `arecord` subprocess (ALSA).
//!
//! The capture process writes mono S16LE at 16 kHz to its stdout; the
//! source reads it in fixed-size chunks. Killing the child is how a
//! recording session is stopped promptly.

use std::env;
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use tracing::{debug, warn};

use voxkey_core::error::{Result, VoxkeyError};
use voxkey_core::types::SAMPLE_RATE;

use crate::{AudioSource, CHUNK_BYTES};

/// Name of the required capture executable.
pub const ARECORD_BIN: &str = "arecord";

/// Remediation hint shown when the capture executable is missing.
pub const INSTALL_HINT: &str = "install with: sudo apt install alsa-utils";

/// Whether the capture executable can be found on `PATH`.
pub fn arecord_available() -> bool {
    env::var_os("PATH")
        .map(|path| search_path(ARECORD_BIN, &path).is_some())
        .unwrap_or(false)
}

/// Fail with a remediation hint when the capture executable is missing.
pub fn ensure_arecord() -> Result<()> {
    if arecord_available() {
        Ok(())
    } else {
        Err(VoxkeyError::DependencyMissing {
            name: ARECORD_BIN.to_string(),
            hint: INSTALL_HINT.to_string(),
        })
    }
}

fn search_path(bin: &str, path: &OsStr) -> Option<PathBuf> {
    env::split_paths(path)
        .map(|dir| dir.join(bin))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Decode little-endian 16-bit samples; a trailing odd byte is dropped.
pub fn bytes_to_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Audio source backed by a live `arecord` child process.
pub struct ArecordSource {
    child: Child,
    stdout: ChildStdout,
}

impl ArecordSource {
    /// Spawn the capture process for one recording session.
    pub fn spawn() -> Result<Self> {
        let mut child = Command::new(ARECORD_BIN)
            .args([
                "-f",
                "S16_LE",
                "-r",
                &SAMPLE_RATE.to_string(),
                "-c",
                "1",
                "-t",
                "raw",
                "-q",
            ])
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| {
                VoxkeyError::AudioStream(format!("failed to start {}: {}", ARECORD_BIN, e))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            VoxkeyError::AudioStream(format!("{} stdout was not captured", ARECORD_BIN))
        })?;

        debug!(pid = child.id(), "Audio capture process started");
        Ok(Self { child, stdout })
    }
}

impl AudioSource for ArecordSource {
    fn next_chunk(&mut self) -> Result<Option<Vec<i16>>> {
        let mut buf = [0u8; CHUNK_BYTES];
        let mut filled = 0;

        while filled < buf.len() {
            match self.stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(VoxkeyError::AudioStream(format!(
                        "capture read failed: {}",
                        e
                    )))
                }
            }
        }

        if filled == 0 {
            return Ok(None);
        }

        Ok(Some(bytes_to_samples(&buf[..filled])))
    }

    fn terminate(&mut self) {
        // kill() on an already-exited child reports an error we don't care about.
        let _ = self.child.kill();
        match self.child.wait() {
            Ok(status) => debug!(%status, "Audio capture process reaped"),
            Err(e) => warn!(error = %e, "Failed to reap audio capture process"),
        }
    }
}

impl Drop for ArecordSource {
    fn drop(&mut self) {
        self.terminate();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_samples_little_endian() {
        // 0x0100 = 256, 0xFFFF = -1
        let samples = bytes_to_samples(&[0x00, 0x01, 0xFF, 0xFF]);
        assert_eq!(samples, vec![256, -1]);
    }

    #[test]
    fn test_bytes_to_samples_drops_trailing_odd_byte() {
        let samples = bytes_to_samples(&[0x01, 0x00, 0x7F]);
        assert_eq!(samples, vec![1]);
    }

    #[test]
    fn test_bytes_to_samples_empty() {
        assert!(bytes_to_samples(&[]).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_search_path_finds_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("fake-recorder");
        std::fs::write(&bin, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        let path = env::join_paths([dir.path().to_path_buf()]).unwrap();
        assert_eq!(search_path("fake-recorder", &path), Some(bin));
    }

    #[cfg(unix)]
    #[test]
    fn test_search_path_ignores_non_executable_files() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("fake-recorder");
        std::fs::write(&bin, "not a program").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o644)).unwrap();

        let path = env::join_paths([dir.path().to_path_buf()]).unwrap();
        assert_eq!(search_path("fake-recorder", &path), None);
    }

    #[test]
    fn test_search_path_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let path = env::join_paths([dir.path().to_path_buf()]).unwrap();
        assert_eq!(search_path("definitely-not-here", &path), None);
    }
}
