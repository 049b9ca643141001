use async_trait::async_trait;
use eyre::Result;
use tracing::Instrument;

use crate::{
    model::{Rotation, VideoReference},
    util::OptionPathExt,
};

use super::{command::ffprobe_get_rotation, FFProbe};

#[async_trait]
pub trait VideoRotationTrait: Send + Sync {
    /// Opens `reference`, reads the rotation of its video stream and releases
    /// the source again before returning.
    async fn video_rotation(&self, reference: &VideoReference) -> Result<Rotation>;
}

#[async_trait]
impl VideoRotationTrait for FFProbe {
    async fn video_rotation(&self, reference: &VideoReference) -> Result<Rotation> {
        ffprobe_get_rotation(reference, self.bin_path.as_opt_path(), &self.remote_headers)
            .in_current_span()
            .await
    }
}
