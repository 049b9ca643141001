use std::{net::SocketAddr, sync::Arc};

use axum::{http::Method, Router};
use camino::Utf8PathBuf as PathBuf;
use clap::Parser;
use eyre::{self, Context, Result};
use rotation_core::{
    channel::ChannelRegistry,
    config::{self, Config},
    service::{RotationService, CHANNEL_NAME},
    startup_self_check,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::info;
use video_rotation::{
    app_state::{AppState, SharedState},
    routes, telemetry,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long)]
    config: Option<String>,
    #[arg(long)]
    skip_startup_check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    telemetry::init("debug,hyper=info")?;

    let config = match args.config {
        Some(config_path) => config::read_config(&PathBuf::from(config_path)).await?,
        None => {
            info!("No config file given, using defaults");
            Config::default()
        }
    };

    if !args.skip_startup_check {
        tracing::info!("Running self check");
        if startup_self_check::run_self_check(&config.bin_paths)
            .await
            .is_err()
        {
            eyre::bail!("Self check failed");
        }
        tracing::info!("Self check successful");
    } else {
        tracing::info!("Skipping self check");
    }

    let mut channels = ChannelRegistry::default();
    channels.register(CHANNEL_NAME, RotationService::from_config(&config))?;
    let shared_state: SharedState = Arc::new(AppState { channels });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);
    let app = Router::new()
        .nest("/api", routes::api_router())
        .layer(
            ServiceBuilder::new()
                .set_x_request_id(MakeRequestUuid)
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().include_headers(true))
                        .on_response(DefaultOnResponse::new().include_headers(true)),
                ),
        )
        .layer(cors)
        .with_state(shared_state);

    let addr = SocketAddr::new(config.server.address, config.server.port);
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err("Error binding socket")?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Error serving")?;
    info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {}
        Err(err) => {
            eprintln!("Unable to listen for shutdown signal: {}", err);
            // we also shut down in case of error
            std::process::exit(1);
        }
    }
}
