use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use rotation_core::channel::{MethodCall, MethodResponse};
use tracing::{debug, Instrument};

use crate::{
    app_state::SharedState,
    http_error::{ApiResult, HttpError},
};

pub fn router() -> Router<SharedState> {
    Router::new().route("/:name", post(post_method_call))
}

#[tracing::instrument(skip_all, fields(channel = %name, method = %call.method))]
async fn post_method_call(
    Path(name): Path<String>,
    State(app_state): State<SharedState>,
    Json(call): Json<MethodCall>,
) -> ApiResult<Json<MethodResponse>> {
    let channel = app_state
        .channels
        .get(&name)
        .ok_or_else(|| HttpError::UnknownChannel(name.clone()))?;
    let response = channel.invoke(call).in_current_span().await?;
    debug!(?response, "method call answered");
    Ok(Json(response))
}
