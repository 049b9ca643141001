use camino::Utf8PathBuf as PathBuf;
use std::fmt::Display;

const REMOTE_SCHEMES: [&str; 2] = ["http://", "https://"];

/// A video to inspect, classified once when it enters the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VideoReference {
    /// HTTP(S) URL, opened with the configured request headers.
    Remote(String),
    /// Path on the local filesystem.
    Local(PathBuf),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("video reference must not be empty")]
pub struct EmptyReference;

impl VideoReference {
    pub fn classify(reference: &str) -> Result<Self, EmptyReference> {
        if reference.is_empty() {
            return Err(EmptyReference);
        }
        let is_remote = REMOTE_SCHEMES.iter().any(|scheme| {
            reference
                .get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        });
        if is_remote {
            Ok(VideoReference::Remote(reference.to_owned()))
        } else {
            Ok(VideoReference::Local(PathBuf::from(reference)))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, VideoReference::Remote(_))
    }

    /// Input argument for ffprobe. Local paths go through the `file:` protocol
    /// so that names containing ':' are never taken for another protocol.
    pub fn probe_input(&self) -> String {
        match self {
            VideoReference::Remote(url) => url.clone(),
            VideoReference::Local(path) => format!("file:{}", path),
        }
    }
}

impl Display for VideoReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoReference::Remote(url) => write!(f, "{}", url),
            VideoReference::Local(path) => write!(f, "{}", path),
        }
    }
}
