use async_trait::async_trait;
use eyre::{bail, Result};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    channel::{MethodCall, MethodCallHandler, MethodResponse},
    config::Config,
    ffprobe::{video_rotation::VideoRotationTrait, FFProbe},
    model::{Rotation, RotationPolicy, VideoReference},
};

pub const CHANNEL_NAME: &str = "video_rotation";
pub const GET_VIDEO_ROTATION: &str = "getVideoRotation";
pub const UNAVAILABLE_CODE: &str = "UNAVAILABLE";
pub const UNAVAILABLE_MESSAGE: &str = "Video rotation not available.";

#[derive(thiserror::Error, Debug)]
#[error("rotation {rotation} rejected by {policy:?}")]
pub struct RotationRejected {
    pub rotation: Rotation,
    pub policy: RotationPolicy,
}

/// Answers `getVideoRotation` calls using a media inspector.
///
/// Every failure is logged and reported to the caller as the same
/// `UNAVAILABLE` error, the cause never crosses the channel.
pub struct RotationService<P> {
    inspector: P,
    policy: RotationPolicy,
}

impl RotationService<FFProbe> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(FFProbe::from_config(config), config.probe.rotation_policy)
    }
}

impl<P: VideoRotationTrait> RotationService<P> {
    pub fn new(inspector: P, policy: RotationPolicy) -> Self {
        Self { inspector, policy }
    }

    #[instrument(skip(self))]
    pub async fn get_video_rotation(&self, reference: &VideoReference) -> Result<Rotation> {
        let rotation = self.inspector.video_rotation(reference).await?;
        if !self.policy.accepts(rotation) {
            return Err(RotationRejected {
                rotation,
                policy: self.policy,
            }
            .into());
        }
        Ok(rotation)
    }

    async fn rotation_for_arguments(&self, arguments: &Value) -> Result<Rotation> {
        let Value::String(reference) = arguments else {
            bail!("expected a video path or URL, got {}", arguments);
        };
        let reference = VideoReference::classify(reference)?;
        self.get_video_rotation(&reference).await
    }
}

#[async_trait]
impl<P: VideoRotationTrait + 'static> MethodCallHandler for RotationService<P> {
    async fn handle(&self, call: MethodCall) -> MethodResponse {
        match call.method.as_str() {
            GET_VIDEO_ROTATION => match self.rotation_for_arguments(&call.arguments).await {
                Ok(rotation) => MethodResponse::success(rotation.degrees()),
                Err(report) => {
                    tracing::error!(
                        "Error getting video rotation for {}:\n{:?}",
                        call.arguments,
                        report
                    );
                    MethodResponse::error(UNAVAILABLE_CODE, UNAVAILABLE_MESSAGE)
                }
            },
            other => {
                debug!(method = other, "method not implemented");
                MethodResponse::NotImplemented
            }
        }
    }
}
