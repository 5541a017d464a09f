//! Run orchestration
//!
//! ## Responsibilities
//!
//! - Acquire one access token shared across all cameras in the run
//! - Per camera: resolve label, request a fresh stream URL, extract frame
//! - Aggregate per-camera outcomes into a run report
//!
//! Execution is strictly sequential; cameras share nothing mutable other
//! than the read-only access token. Fatal errors (Config/Auth) abort the
//! run; everything else is recorded per camera and the loop continues.

use crate::capture::labeled_output_path;
use crate::config::Settings;
use crate::error::Result;
use crate::sdm::AccessToken;
use std::path::{Path, PathBuf};

/// Cloud side of a capture: token refresh and stream URL generation.
///
/// Implemented by `SdmClient`; faked in tests.
pub trait StreamSource {
    /// Exchange the refresh credential for a short-lived access token.
    async fn refresh_access_token(&self) -> Result<AccessToken>;

    /// Request a fresh RTSP stream URL for a resolved device. Handles are
    /// ephemeral and never cached across cameras or runs.
    async fn rtsp_stream_url(&self, token: &AccessToken, device_id: &str) -> Result<String>;
}

/// Local side of a capture: pull one frame from a stream URL to disk.
///
/// Implemented by `FfmpegExtractor`; faked in tests.
pub trait FrameSink {
    async fn write_frame(&self, stream_url: &str, output: &Path) -> Result<()>;
}

/// Outcome for a single camera.
#[derive(Debug)]
pub struct CameraOutcome {
    pub label: String,
    pub result: Result<PathBuf>,
}

/// Aggregated per-camera results for one run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<CameraOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_ok(&self) -> bool {
        self.failed() == 0
    }
}

/// Capture one frame for every configured camera.
///
/// Returns `Err` only for fatal errors (token acquisition, and any
/// Config/Auth error surfacing mid-run); per-camera failures are logged
/// and recorded in the report.
pub async fn run<S, F>(
    settings: &Settings,
    source: &S,
    sink: &F,
    output: &Path,
) -> Result<RunReport>
where
    S: StreamSource,
    F: FrameSink,
{
    let token = source.refresh_access_token().await?;
    tracing::info!("Access token acquired");

    let mut report = RunReport::default();

    for camera in settings.cameras.iter() {
        tracing::info!(camera = %camera.label, "Processing camera");

        let result = capture_one(settings, source, sink, &token, &camera.label, output).await;

        let result = match result {
            Ok(path) => {
                tracing::info!(
                    camera = %camera.label,
                    path = %path.display(),
                    "Snapshot saved"
                );
                Ok(path)
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::error!(
                    camera = %camera.label,
                    error = %e,
                    "Camera capture failed"
                );
                Err(e)
            }
        };

        report.outcomes.push(CameraOutcome {
            label: camera.label.clone(),
            result,
        });
    }

    Ok(report)
}

/// Resolve, fetch a stream URL, and extract a frame for one camera.
async fn capture_one<S, F>(
    settings: &Settings,
    source: &S,
    sink: &F,
    token: &AccessToken,
    label: &str,
    output: &Path,
) -> Result<PathBuf>
where
    S: StreamSource,
    F: FrameSink,
{
    let device_id = settings.cameras.resolve(label)?;

    let stream_url = source.rtsp_stream_url(token, device_id).await?;
    tracing::debug!(camera = %label, "Stream URL obtained");

    let path = labeled_output_path(output, label);
    sink.write_frame(&stream_url, &path).await?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::Error;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn settings() -> Settings {
        Settings::parse(
            "[secrets]\n\
             CLIENT_ID=cid\n\
             CLIENT_SECRET=sec\n\
             REFRESH_TOKEN=rt\n\
             PROJECT_ID=proj\n\
             [cameras]\n\
             backyard=dev123\n\
             frontdoor=dev456\n",
        )
        .unwrap()
    }

    struct FakeSource {
        token_ok: bool,
        fail_devices: HashSet<String>,
        stream_requests: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new(token_ok: bool) -> Self {
            Self {
                token_ok,
                fail_devices: HashSet::new(),
                stream_requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl StreamSource for FakeSource {
        async fn refresh_access_token(&self) -> Result<AccessToken> {
            if self.token_ok {
                Ok(AccessToken::new("tok-abc".to_string()))
            } else {
                Err(Error::Auth("refresh rejected".to_string()))
            }
        }

        async fn rtsp_stream_url(
            &self,
            token: &AccessToken,
            device_id: &str,
        ) -> Result<String> {
            assert_eq!(token.as_str(), "tok-abc");
            self.stream_requests
                .lock()
                .unwrap()
                .push(device_id.to_string());
            if self.fail_devices.contains(device_id) {
                return Err(Error::Stream(
                    "stream response missing field: results.streamUrls".to_string(),
                ));
            }
            Ok(format!("rtsp://host/{}", device_id))
        }
    }

    struct FakeSink {
        fail_urls: HashSet<String>,
    }

    impl FrameSink for FakeSink {
        async fn write_frame(&self, stream_url: &str, output: &Path) -> Result<()> {
            if self.fail_urls.contains(stream_url) {
                return Err(Error::Capture("ffmpeg failed: exit 1".to_string()));
            }
            std::fs::write(output, b"jpeg")?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_all_cameras_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("snap.jpg");
        let source = FakeSource::new(true);
        let sink = FakeSink {
            fail_urls: HashSet::new(),
        };

        let report = run(&settings(), &source, &sink, &output).await.unwrap();

        assert!(report.all_ok());
        assert_eq!(report.succeeded(), 2);
        assert!(dir.path().join("backyard_snap.jpg").exists());
        assert!(dir.path().join("frontdoor_snap.jpg").exists());
    }

    #[tokio::test]
    async fn test_run_one_capture_fails_others_continue() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("snap.jpg");
        let source = FakeSource::new(true);
        let sink = FakeSink {
            fail_urls: ["rtsp://host/dev456".to_string()].into_iter().collect(),
        };

        let report = run(&settings(), &source, &sink, &output).await.unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(dir.path().join("backyard_snap.jpg").exists());
        assert!(!dir.path().join("frontdoor_snap.jpg").exists());

        let failed = report
            .outcomes
            .iter()
            .find(|o| o.result.is_err())
            .unwrap();
        assert_eq!(failed.label, "frontdoor");
        assert!(matches!(
            failed.result.as_ref().unwrap_err(),
            Error::Capture(_)
        ));
    }

    #[tokio::test]
    async fn test_run_stream_failure_is_recorded_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("snap.jpg");
        let mut source = FakeSource::new(true);
        source.fail_devices.insert("dev123".to_string());
        let sink = FakeSink {
            fail_urls: HashSet::new(),
        };

        let report = run(&settings(), &source, &sink, &output).await.unwrap();

        assert_eq!(report.failed(), 1);
        assert!(dir.path().join("frontdoor_snap.jpg").exists());
    }

    #[tokio::test]
    async fn test_run_token_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("snap.jpg");
        let source = FakeSource::new(false);
        let sink = FakeSink {
            fail_urls: HashSet::new(),
        };

        let err = run(&settings(), &source, &sink, &output)
            .await
            .unwrap_err();
        assert!(err.is_fatal());
        // No per-camera work happened.
        assert!(source.stream_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_requests_fresh_stream_per_camera() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("snap.jpg");
        let source = FakeSource::new(true);
        let sink = FakeSink {
            fail_urls: HashSet::new(),
        };

        run(&settings(), &source, &sink, &output).await.unwrap();

        let requests = source.stream_requests.lock().unwrap();
        assert_eq!(requests.as_slice(), ["dev123", "dev456"]);
    }
}
