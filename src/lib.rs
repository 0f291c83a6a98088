//! Site Builder Backend - block-based page editor API and its store

pub mod blocks;
pub mod db;
pub mod logging;
pub mod routes;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::blocks::BlockRepository;
use crate::db::visits::VisitRepository;

/// Shared handler state. The pool is owned here and cloned cheaply per request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub blocks: BlockRepository,
    pub visits: VisitRepository,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            blocks: BlockRepository::new(pool.clone()),
            visits: VisitRepository::new(pool.clone()),
            pool,
        }
    }
}

fn parse_origins(allowed: Option<String>, frontend: Option<String>) -> Vec<HeaderValue> {
    allowed
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            frontend
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]
        })
}

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN, and falls back
/// to the local editor dev server.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = parse_origins(
        std::env::var("ALLOWED_ORIGINS").ok(),
        std::env::var("FRONTEND_ORIGIN").ok(),
    );

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors();
    tracing::info!("CORS configured");

    Router::new()
        .route(
            "/api/blocks",
            get(routes::blocks::list_blocks).post(routes::blocks::create_block),
        )
        .route("/api/blocks/reorder", post(routes::blocks::reorder_blocks))
        .route(
            "/api/blocks/defaults/{block_type}",
            get(routes::blocks::get_defaults),
        )
        .route(
            "/api/blocks/{id}",
            get(routes::blocks::get_block)
                .put(routes::blocks::update_block)
                .delete(routes::blocks::delete_block),
        )
        .route("/api/blocks/{id}/move", post(routes::blocks::move_block))
        .route("/api/analytics/visit", post(routes::analytics::track_visit))
        .route(
            "/api/analytics/summary",
            get(routes::analytics::visit_summary),
        )
        .route("/health", get(routes::health::health_ping))
        .route("/health/database", get(routes::health::health_database))
        .route("/health/ready", get(routes::health::health_ready))
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Block documents are small; 2 MB covers large galleries
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(cors)
}

fn bind_address() -> Result<SocketAddr, std::net::AddrParseError> {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3001);
    format!("{}:{}", host, port).parse()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Run the server (used by main).
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let log_config = logging::LogConfig::from_env();
    // Dropping the guards stops the background writers and loses buffered lines.
    let _log_guards = logging::init(&log_config);

    routes::health::init_start_time();

    if log_config.is_production() {
        tracing::warn!(
            "SECURITY: the editor API has no authentication. \
             Keep it behind a trusted proxy or private network."
        );
    }

    let pool = db::init_pool(None).await?;
    db::run_migrations(&pool).await?;

    let app = create_app(AppState::new(pool.clone()));

    let addr = bind_address()?;
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}
