use std::process::Stdio;

use camino::Utf8Path as Path;
use eyre::{Context, Result};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::{
    model::{Rotation, VideoReference},
    util::bin_or_default,
};

#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    #[error("Error starting ffprobe")]
    ErrorStarting,
    #[error("ffprobe could not open {reference}: {message}")]
    OpenFailed { reference: String, message: String },
    #[error("no video stream in {0}")]
    NoVideoStream(String),
    #[error("rotation value {0} is not an integer")]
    NotAnInteger(String),
}

#[instrument(skip(remote_headers))]
pub async fn ffprobe_get_rotation(
    reference: &VideoReference,
    ffprobe_bin_path: Option<&Path>,
    remote_headers: &[(String, String)],
) -> Result<Rotation> {
    let mut command = Command::new(bin_or_default(ffprobe_bin_path, "ffprobe"));
    command
        .args(["-v", "error", "-select_streams", "v", "-show_streams"])
        .args(["-of", "json=compact=1"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // the child is killed and reaped if this future is dropped or returns early
        .kill_on_drop(true);
    if reference.is_remote() && !remote_headers.is_empty() {
        command.arg("-headers").arg(join_headers(remote_headers));
    }
    command.arg(reference.probe_input());
    debug!(command = ?command.as_std(), "Invoking ffprobe");
    let output = command
        .spawn()
        .wrap_err(ProbeError::ErrorStarting)?
        .wait_with_output()
        .await
        .wrap_err("ffprobe error")?;
    if !output.status.success() {
        return Err(ProbeError::OpenFailed {
            reference: reference.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        }
        .into());
    }
    parse_ffprobe_rotation(&output.stdout)?
        .ok_or_else(|| ProbeError::NoVideoStream(reference.to_string()).into())
}

fn join_headers(headers: &[(String, String)]) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{}: {}\r\n", name, value))
        .collect()
}

/// Rotation of the first video stream in ffprobe's JSON output, or `None` if
/// there is no video stream. Cover art is not counted as a video stream.
pub fn parse_ffprobe_rotation(json: &[u8]) -> Result<Option<Rotation>> {
    #[derive(Debug, Clone, Deserialize)]
    struct FFProbeSideData {
        pub rotation: Option<serde_json::Number>,
    }
    #[derive(Debug, Clone, Deserialize)]
    struct FFProbeTags {
        pub rotate: Option<String>,
    }
    #[derive(Debug, Clone, Deserialize)]
    struct FFProbeDisposition {
        #[serde(default)]
        pub attached_pic: i32,
    }
    #[derive(Debug, Clone, Deserialize)]
    struct FFProbeStream {
        pub codec_type: Option<String>,
        pub tags: Option<FFProbeTags>,
        pub disposition: Option<FFProbeDisposition>,
        pub side_data_list: Option<Vec<FFProbeSideData>>,
    }
    #[derive(Debug, Clone, Deserialize)]
    struct FFProbeOutput {
        #[serde(default)]
        pub streams: Vec<FFProbeStream>,
    }

    let parsed: FFProbeOutput =
        serde_json::from_slice(json).wrap_err("could not parse ffprobe output")?;
    let mut video_streams = parsed.streams.into_iter().filter(|stream| {
        stream.codec_type.as_deref() == Some("video")
            && stream
                .disposition
                .as_ref()
                .map_or(true, |disposition| disposition.attached_pic == 0)
    });
    let Some(video) = video_streams.next() else {
        return Ok(None);
    };
    if video_streams.next().is_some() {
        warn!("multiple video streams in file, using the first one");
    }

    let display_matrix_rotation = video
        .side_data_list
        .iter()
        .flatten()
        .find_map(|side_data| side_data.rotation.as_ref());
    if let Some(counter_clockwise) = display_matrix_rotation {
        return display_matrix_to_clockwise(counter_clockwise).map(Some);
    }
    match video.tags.and_then(|tags| tags.rotate) {
        Some(rotate) => match rotate.trim().parse::<i32>() {
            Ok(degrees) => Ok(Some(Rotation(degrees))),
            Err(_) => Err(ProbeError::NotAnInteger(rotate).into()),
        },
        // no display matrix side data means the identity matrix
        None => Ok(Some(Rotation(0))),
    }
}

/// ffprobe reports the display matrix angle counter-clockwise, the rotation
/// tag and everything downstream of it are clockwise.
fn display_matrix_to_clockwise(counter_clockwise: &serde_json::Number) -> Result<Rotation> {
    let not_an_integer = || ProbeError::NotAnInteger(counter_clockwise.to_string());
    let degrees = match counter_clockwise.as_i64() {
        Some(degrees) => degrees,
        None => {
            let degrees = counter_clockwise.as_f64().ok_or_else(not_an_integer)?;
            if degrees.fract() != 0.0 || degrees.abs() > i32::MAX as f64 {
                return Err(not_an_integer().into());
            }
            degrees as i64
        }
    };
    let clockwise = degrees
        .checked_neg()
        .ok_or_else(not_an_integer)?
        .rem_euclid(360);
    Ok(Rotation(clockwise as i32))
}
