use std::process::ExitCode;

use camino::Utf8PathBuf as PathBuf;
use clap::Parser;
use eyre::{Context, Result};
use rotation_core::{
    channel::{ChannelHandle, MethodCall},
    config::{self, Config},
    service::{RotationService, CHANNEL_NAME, GET_VIDEO_ROTATION},
};
use video_rotation::telemetry;

/// Print the rotation of a video file or URL.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long)]
    config: Option<String>,
    /// Local path or http(s) URL
    reference: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    telemetry::init("warn")?;

    let config = match args.config {
        Some(config_path) => config::read_config(&PathBuf::from(config_path)).await?,
        None => Config::default(),
    };
    let channel = ChannelHandle::new(CHANNEL_NAME, RotationService::from_config(&config));
    let response = channel
        .invoke(MethodCall::new(GET_VIDEO_ROTATION, args.reference))
        .await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&response).wrap_err("error serializing response")?
    );
    if response.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
