//! nestsnap - capture one still image per configured camera
//!
//! Main entry point. Exit code is zero when the fatal stages (config
//! load, token acquisition) succeed, even if individual cameras failed;
//! per-camera failures are logged and summarized.

use clap::Parser;
use nestsnap::capture::FfmpegExtractor;
use nestsnap::config::Settings;
use nestsnap::sdm::SdmClient;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "nestsnap",
    version,
    about = "Capture still images from cloud-managed security cameras"
)]
struct Cli {
    /// Output file path; each camera's label is prepended to the filename
    output: PathBuf,

    /// Path to the secrets/camera-registry INI file
    #[arg(long, default_value = "secrets.ini")]
    config: PathBuf,

    /// Log device traits for each camera instead of capturing
    #[arg(long)]
    probe: bool,

    /// HTTP client timeout in seconds
    #[arg(long, default_value_t = 30)]
    http_timeout_secs: u64,

    /// ffmpeg timeout in seconds per capture
    #[arg(long, default_value_t = 60)]
    ffmpeg_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nestsnap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting nestsnap v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load(&cli.config)?;
    tracing::info!(
        config = %cli.config.display(),
        cameras = settings.cameras.len(),
        "Settings loaded"
    );

    let client = SdmClient::new(
        settings.credentials.clone(),
        Duration::from_secs(cli.http_timeout_secs),
    );

    if cli.probe {
        return probe(&settings, &client).await;
    }

    let extractor = FfmpegExtractor::new(Duration::from_secs(cli.ffmpeg_timeout_secs));
    let report = nestsnap::run::run(&settings, &client, &extractor, &cli.output).await?;

    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Run complete"
    );

    Ok(())
}

/// Fetch and log device traits for every configured camera.
async fn probe(settings: &Settings, client: &SdmClient) -> anyhow::Result<()> {
    let token = client.refresh_access_token().await?;

    for camera in settings.cameras.iter() {
        match client.device_info(&token, &camera.device_id).await {
            Ok(info) => {
                tracing::info!(camera = %camera.label, info = %info, "Device info");
            }
            Err(e) => {
                tracing::error!(camera = %camera.label, error = %e, "Device info failed");
            }
        }
    }

    Ok(())
}
