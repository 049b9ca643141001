use axum::{extract::State, routing::get, Json, Router};

use crate::app_state::SharedState;

pub mod channel;

async fn get_channels(app_state: State<SharedState>) -> Json<Vec<String>> {
    let mut names: Vec<String> = app_state.channels.names().map(String::from).collect();
    names.sort();
    Json(names)
}

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/channels", get(get_channels))
        .nest("/channel", channel::router())
}
