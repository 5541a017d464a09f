//! nestsnap - still-image capture from cloud-managed cameras
//!
//! Single-shot batch job: exchange a long-lived refresh token for an
//! access token, resolve each configured camera label to its SDM device
//! id, request generation of an ephemeral RTSP stream URL, and extract
//! one frame from that stream to disk with ffmpeg. Intended to be invoked
//! repeatedly by an external scheduler (cron).
//!
//! ## Components
//!
//! 1. Settings - credentials and camera registry from an INI file
//! 2. CameraRegistry - case-insensitive label -> device id resolution
//! 3. SdmClient - Google SDM token refresh and stream generation
//! 4. FfmpegExtractor - single-frame extraction from an RTSP stream
//! 5. run - per-camera orchestration and the run report
//!
//! ## Design principles
//!
//! - One access token per invocation, shared read-only, never persisted
//! - A stream URL is requested fresh for every capture attempt
//! - Config/Auth failures abort the run; per-camera failures do not
//! - No retries: the scheduler owns re-invocation cadence

pub mod capture;
pub mod config;
pub mod error;
pub mod registry;
pub mod run;
pub mod sdm;

pub use error::{Error, Result};
