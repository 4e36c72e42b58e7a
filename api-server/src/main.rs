//! API Server for TaskMgmt
//!
//! This is the main entry point for the task management REST API.

mod routes;
mod state;

use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tm_core::task::{seed_if_empty, SqliteTaskStore, DEFAULT_SEED_COUNT};

use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine data directory
    let data_dir = std::env::var("TM_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".tm-data"));

    tracing::info!("Using data directory: {:?}", data_dir);
    std::fs::create_dir_all(&data_dir).expect("Failed to create data directory");

    let store = SqliteTaskStore::new(data_dir.join("tasks.db"))
        .await
        .expect("Failed to open task database");

    // One-time bootstrap: fill an empty database with synthetic tasks
    let seeded = seed_if_empty(&store, DEFAULT_SEED_COUNT)
        .await
        .expect("Failed to seed task database");
    if seeded > 0 {
        tracing::info!("Seeded {} synthetic tasks", seeded);
    }

    let app_state = AppState::with_store(Arc::new(store));

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::task::router())
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("TM_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("REST API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
