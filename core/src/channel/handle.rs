use std::sync::Arc;

use async_trait::async_trait;
use eyre::{eyre, Context, Result};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, Instrument};

use super::{MethodCall, MethodResponse};

const CHANNEL_CAPACITY: usize = 1000;

/// Receives every call sent on one channel.
#[async_trait]
pub trait MethodCallHandler: Send + Sync + 'static {
    async fn handle(&self, call: MethodCall) -> MethodResponse;
}

#[derive(Debug)]
struct ChannelRequest {
    call: MethodCall,
    respond: oneshot::Sender<MethodResponse>,
}

/// Sending side of a named channel. Cloning the handle shares the channel.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    name: Arc<str>,
    send: mpsc::Sender<ChannelRequest>,
}

impl ChannelHandle {
    /// Spawns the task serving `handler`. Must be called from within a tokio runtime.
    pub fn new<H: MethodCallHandler>(name: &str, handler: H) -> Self {
        let (send, recv) = mpsc::channel(CHANNEL_CAPACITY);
        let name: Arc<str> = name.into();
        tokio::spawn(run_channel(name.clone(), Arc::new(handler), recv));
        Self { name, send }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sends `call` and waits for its response.
    pub async fn invoke(&self, call: MethodCall) -> Result<MethodResponse> {
        let (respond, response) = oneshot::channel();
        self.send
            .send(ChannelRequest { call, respond })
            .await
            .map_err(|_| eyre!("channel {} is closed", self.name))?;
        response
            .await
            .wrap_err_with(|| format!("channel {} dropped the call without responding", self.name))
    }
}

#[instrument(skip(handler, recv))]
async fn run_channel(
    name: Arc<str>,
    handler: Arc<dyn MethodCallHandler>,
    mut recv: mpsc::Receiver<ChannelRequest>,
) {
    while let Some(ChannelRequest { call, respond }) = recv.recv().await {
        // calls run independently of each other, nothing is deduplicated
        let handler = handler.clone();
        tokio::spawn(
            async move {
                let method = call.method.clone();
                let response = handler.handle(call).await;
                if respond.send(response).is_err() {
                    debug!(%method, "caller went away before the response was sent");
                }
            }
            .in_current_span(),
        );
    }
    debug!("all handles dropped, closing channel");
}
