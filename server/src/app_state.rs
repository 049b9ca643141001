use std::sync::Arc;

use rotation_core::channel::ChannelRegistry;

pub struct AppState {
    pub channels: ChannelRegistry,
}

pub type SharedState = Arc<AppState>;
