use std::process::Stdio;

use camino::Utf8Path as Path;
use tokio::process::Command;

use crate::{
    config::BinPaths,
    util::{bin_or_default, OptionPathExt},
};

pub async fn run_self_check(bin_paths: &BinPaths) -> Result<(), ()> {
    check_can_run_ffprobe(bin_paths.ffprobe.as_opt_path()).await?;
    Ok(())
}

async fn check_can_run_ffprobe(ffprobe_bin_path: Option<&Path>) -> Result<(), ()> {
    let spawn_result = Command::new(bin_or_default(ffprobe_bin_path, "ffprobe"))
        .arg("-version")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();
    let ffprobe = match spawn_result {
        Ok(c) => c,
        Err(err) => match err.kind() {
            std::io::ErrorKind::NotFound => {
                if let Some(path) = ffprobe_bin_path {
                    tracing::error!("Could not find ffprobe at path from config: {}", path);
                } else {
                    tracing::error!("Could not find ffprobe (no 'ffprobe' in $PATH). Is it installed?");
                }
                return Err(());
            }
            _kind => {
                tracing::error!("Error running ffprobe: {}", err);
                return Err(());
            }
        },
    };
    let output = match ffprobe.wait_with_output().await {
        Ok(o) => o,
        Err(err) => {
            tracing::error!(
                "ffprobe test failed, error waiting for ffprobe process: {}",
                err
            );
            return Err(());
        }
    };
    if !output.status.success() {
        tracing::error!(
            "ffprobe test failed, 'ffprobe -version' exited with an error:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
        return Err(());
    }
    tracing::debug!("ok: can run ffprobe");
    Ok(())
}

#[tokio::test]
async fn missing_ffprobe_fails_self_check() {
    let bin_paths = BinPaths {
        ffprobe: Some("/nonexistent/bin/ffprobe".into()),
    };
    assert_eq!(run_self_check(&bin_paths).await, Err(()));
}
