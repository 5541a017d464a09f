//! Frame extraction from RTSP streams using ffmpeg
//!
//! ## Responsibilities
//!
//! - Spawn ffmpeg to pull exactly one frame from a stream URL to disk
//! - Bound the process with a timeout (kill_on_drop cleans up on expiry)
//! - Derive per-camera output filenames from the base output path

use crate::error::{Error, Result};
use crate::run::FrameSink;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Frame extractor backed by the external ffmpeg binary.
pub struct FfmpegExtractor {
    timeout: Duration,
}

impl FfmpegExtractor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl FrameSink for FfmpegExtractor {
    /// Extract one frame to `output`, overwriting if present.
    ///
    /// kill_on_drop(true) ensures the ffmpeg process is killed if the
    /// timeout fires and the wait future is cancelled, so unresponsive
    /// cameras cannot leave zombie processes behind.
    async fn write_frame(&self, stream_url: &str, output: &Path) -> Result<()> {
        let child = Command::new("ffmpeg")
            .args([
                "-rtsp_transport",
                "tcp",
                "-i",
                stream_url,
                "-frames:v",
                "1",
                "-loglevel",
                "error",
                "-y",
            ])
            .arg(output)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Capture(format!("ffmpeg spawn failed: {}", e)))?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(out)) => {
                if !out.status.success() {
                    let stderr = String::from_utf8_lossy(&out.stderr);
                    return Err(Error::Capture(format!(
                        "ffmpeg failed: {}",
                        stderr.trim()
                    )));
                }
                Ok(())
            }
            Ok(Err(e)) => Err(Error::Capture(format!("ffmpeg execution failed: {}", e))),
            Err(_) => {
                tracing::warn!(
                    timeout_sec = self.timeout.as_secs(),
                    output = %output.display(),
                    "ffmpeg timeout, process killed via kill_on_drop"
                );
                Err(Error::Capture(format!(
                    "ffmpeg timeout ({}s)",
                    self.timeout.as_secs()
                )))
            }
        }
    }
}

/// Prefix a camera label onto the filename component of `base`,
/// preserving the directory: `/out/snap.jpg` + `backyard` ->
/// `/out/backyard_snap.jpg`.
pub fn labeled_output_path(base: &Path, label: &str) -> PathBuf {
    let file_name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let labeled = format!("{}_{}", label, file_name);

    match base.parent() {
        Some(dir) => dir.join(labeled),
        None => PathBuf::from(labeled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_output_path() {
        assert_eq!(
            labeled_output_path(Path::new("/out/snap.jpg"), "backyard"),
            PathBuf::from("/out/backyard_snap.jpg")
        );
    }

    #[test]
    fn test_labeled_output_path_bare_filename() {
        assert_eq!(
            labeled_output_path(Path::new("snap.jpg"), "frontdoor"),
            PathBuf::from("frontdoor_snap.jpg")
        );
    }

    #[test]
    fn test_labeled_output_path_nested_dir() {
        assert_eq!(
            labeled_output_path(Path::new("/var/snapshots/daily/snap.jpg"), "garage"),
            PathBuf::from("/var/snapshots/daily/garage_snap.jpg")
        );
    }

    #[tokio::test]
    async fn test_write_frame_bad_stream_fails() {
        // ffmpeg exits non-zero for an unreachable stream; either way the
        // error must be a Capture kind (spawn failure if ffmpeg is absent).
        let extractor = FfmpegExtractor::new(Duration::from_secs(5));
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("frame.jpg");
        let err = extractor
            .write_frame("rtsp://127.0.0.1:1/nothing", &out)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Capture(_)), "got {:?}", err);
        assert!(!err.is_fatal());
    }
}
