use camino::Utf8PathBuf as PathBuf;

use crate::config::Config;

mod command;
pub mod video_rotation;

pub use command::{ffprobe_get_rotation, parse_ffprobe_rotation, ProbeError};

/// Media inspector backed by the ffprobe binary.
#[derive(Debug, Clone, Default)]
pub struct FFProbe {
    pub bin_path: Option<PathBuf>,
    /// Sent with every remote open, empty unless configured.
    pub remote_headers: Vec<(String, String)>,
}

impl FFProbe {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bin_path: config.bin_paths.ffprobe.clone(),
            remote_headers: config.probe.remote_headers.clone(),
        }
    }
}
