//! Runs the ffprobe code path against a shell script standing in for ffprobe.
#![cfg(unix)]

use std::{os::unix::fs::PermissionsExt, time::Duration};

use camino::Utf8PathBuf as PathBuf;
use claims::{assert_err, assert_ok, assert_some};
use pretty_assertions::assert_eq;
use rotation_core::{
    channel::{ChannelHandle, MethodCall, MethodResponse},
    config::{BinPaths, Config},
    ffprobe::{video_rotation::VideoRotationTrait, FFProbe, ProbeError},
    model::{Rotation, VideoReference},
    service::{RotationService, CHANNEL_NAME, GET_VIDEO_ROTATION, UNAVAILABLE_CODE, UNAVAILABLE_MESSAGE},
    startup_self_check::run_self_check,
};

const FAKE_FFPROBE: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then
    echo "ffprobe version 6.1-fake"
    exit 0
fi
printf '%s\n' "$@" > "$(dirname "$0")/last_args"
for input; do :; done
case "$input" in
    file:/storage/emulated/0/video.mp4)
        echo '{"streams":[{"index":0,"codec_type":"video","side_data_list":[{"side_data_type":"Display Matrix","rotation":-90}]}]}'
        ;;
    https://example.com/clip.mp4)
        echo '{"streams":[{"index":0,"codec_type":"video","codec_name":"h264"}]}'
        ;;
    file:/videos/audio-only.m4a)
        echo '{"streams":[]}'
        ;;
    file:/videos/stalled.mp4)
        echo $$ > "$(dirname "$0")/pid"
        exec sleep 30
        ;;
    file:/videos/bad-tag.mp4)
        echo '{"streams":[{"index":0,"codec_type":"video","tags":{"rotate":"sideways"}}]}'
        ;;
    *)
        echo "$input: No such file or directory" >&2
        exit 1
        ;;
esac
"#;

struct FakeFFProbe {
    dir: tempfile::TempDir,
    bin_path: PathBuf,
}

impl FakeFFProbe {
    fn install() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bin_path = PathBuf::from_path_buf(dir.path().join("ffprobe")).unwrap();
        std::fs::write(&bin_path, FAKE_FFPROBE).unwrap();
        std::fs::set_permissions(&bin_path, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir, bin_path }
    }

    fn last_args(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("last_args"))
            .unwrap()
            .lines()
            .map(|line| line.to_owned())
            .collect()
    }

    /// Pid the fake ffprobe recorded before stalling, once it has started.
    async fn stalled_pid(&self) -> u32 {
        let pid_path = self.dir.path().join("pid");
        for _ in 0..100 {
            if let Ok(pid) = std::fs::read_to_string(&pid_path) {
                if let Ok(pid) = pid.trim().parse() {
                    return pid;
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("fake ffprobe never recorded its pid");
    }

    fn config(&self, remote_headers: Vec<(String, String)>) -> Config {
        let mut config = Config::default();
        config.bin_paths = BinPaths {
            ffprobe: Some(self.bin_path.clone()),
        };
        config.probe.remote_headers = remote_headers;
        config
    }
}

// A single test so that writing the script never races with another test
// spawning a process.
#[tokio::test]
async fn rotation_through_ffprobe() {
    let fake = FakeFFProbe::install();

    assert_eq!(run_self_check(&fake.config(vec![]).bin_paths).await, Ok(()));

    let headers = vec![("User-Agent".to_owned(), "video-rotation".to_owned())];
    let ffprobe = FFProbe::from_config(&fake.config(headers));

    let local = VideoReference::classify("/storage/emulated/0/video.mp4").unwrap();
    assert_eq!(assert_ok!(ffprobe.video_rotation(&local).await), Rotation(90));
    let args = fake.last_args();
    assert!(!args.iter().any(|arg| arg == "-headers"));
    assert_eq!(args.last().map(|s| s.as_str()), Some("file:/storage/emulated/0/video.mp4"));

    let remote = VideoReference::classify("https://example.com/clip.mp4").unwrap();
    assert_eq!(assert_ok!(ffprobe.video_rotation(&remote).await), Rotation(0));
    let args = fake.last_args();
    let headers_at = assert_some!(args.iter().position(|arg| arg == "-headers"));
    assert!(args[headers_at + 1].starts_with("User-Agent: video-rotation"));

    let missing = VideoReference::classify("/nonexistent.mp4").unwrap();
    let err = assert_err!(ffprobe.video_rotation(&missing).await);
    assert!(matches!(
        assert_some!(err.downcast_ref::<ProbeError>()),
        ProbeError::OpenFailed { message, .. } if message.contains("No such file")
    ));

    let audio_only = VideoReference::classify("/videos/audio-only.m4a").unwrap();
    let err = assert_err!(ffprobe.video_rotation(&audio_only).await);
    assert!(matches!(
        assert_some!(err.downcast_ref::<ProbeError>()),
        ProbeError::NoVideoStream(_)
    ));

    let not_started = FFProbe {
        bin_path: Some(fake.bin_path.with_file_name("not-ffprobe")),
        remote_headers: vec![],
    };
    let err = assert_err!(not_started.video_rotation(&local).await);
    assert!(matches!(
        assert_some!(err.downcast_ref::<ProbeError>()),
        ProbeError::ErrorStarting
    ));

    // dropping an in-flight probe kills the ffprobe process
    let stalled = VideoReference::classify("/videos/stalled.mp4").unwrap();
    assert_err!(
        tokio::time::timeout(Duration::from_secs(2), ffprobe.video_rotation(&stalled)).await
    );
    let pid = fake.stalled_pid().await;
    if cfg!(target_os = "linux") {
        let mut released = false;
        for _ in 0..100 {
            if !process_running(pid) {
                released = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(released, "ffprobe process {} still running after drop", pid);
    }

    // the same cases over the channel
    let channel = ChannelHandle::new(
        CHANNEL_NAME,
        RotationService::from_config(&fake.config(vec![])),
    );
    let unavailable = MethodResponse::error(UNAVAILABLE_CODE, UNAVAILABLE_MESSAGE);
    let cases = [
        ("/storage/emulated/0/video.mp4", MethodResponse::success(90)),
        ("https://example.com/clip.mp4", MethodResponse::success(0)),
        ("/nonexistent.mp4", unavailable.clone()),
        ("/videos/audio-only.m4a", unavailable.clone()),
        ("/videos/bad-tag.mp4", unavailable.clone()),
    ];
    for (reference, expected) in cases {
        let response = assert_ok!(
            channel
                .invoke(MethodCall::new(GET_VIDEO_ROTATION, reference))
                .await
        );
        assert_eq!(response, expected, "response for {}", reference);
    }
}

/// Linux only. Running means alive and not yet a zombie waiting to be reaped.
fn process_running(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        // state is the field after the parenthesized command name
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z" && state != "X"),
        Err(_) => false,
    }
}
