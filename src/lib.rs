pub mod serial;
pub mod device;
pub mod commands;
pub mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};

use tower_http::services::ServeDir;

use commands::AppState;
use config::BridgeSettings;
use device::DeviceManager;
use serial::SerialChannel;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(commands::get_healthz))
        .route("/ping", get(commands::ping))
        .route(
            "/operation",
            get(commands::get_operation)
                .put(commands::put_operation)
                .fallback(commands::operation_method_not_allowed),
        )
}

/// Build the HTTP routes over the shared device state
pub fn router(state: AppState) -> Router {
    api_routes()
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Same routes, with files under `static_dir` served for every other path
/// (`/` maps to `index.html`)
pub fn router_with_static(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    api_routes()
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    log::info!("{} {}", request.method(), request.uri());
    next.run(request).await
}

/// Open the serial device and serve the HTTP API until the server stops
pub async fn run(settings: BridgeSettings) -> anyhow::Result<()> {
    let channel = SerialChannel::open(&settings.port_name, settings.baud_rate, settings.write_timeout())
        .with_context(|| format!("failed to open the serial device {}", settings.port_name))?;
    let device_manager = Arc::new(DeviceManager::new(channel));

    let state = AppState {
        device_manager: device_manager.clone(),
        require_json_content_type: settings.require_json_content_type,
    };

    let addr = settings.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    log::info!("Motor bridge listening on {} (device {})", addr, settings.port_name);
    let app = match &settings.static_dir {
        Some(dir) => {
            log::info!("Serving static files from {}", dir);
            router_with_static(state, dir)
        }
        None => router(state),
    };

    let served = axum::serve(listener, app).await;

    device_manager.shutdown().await?;
    served.context("HTTP server failed")
}
