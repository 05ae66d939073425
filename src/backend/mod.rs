pub mod auth;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use sqlx::{Pool, Sqlite};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{Config, ServerConfig};
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Pool<Sqlite>, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

fn cors_layer(server: &ServerConfig) -> Result<CorsLayer> {
    let origins = server
        .cors_origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|_| Error::ConfigValidation {
                message: format!("invalid CORS origin '{origin}'"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

/// The full application: API routes, CORS, request tracing and JSON 404/405 bodies.
pub fn build_router(state: AppState) -> Result<Router> {
    let cors = cors_layer(&state.config.server)?;

    Ok(Router::new()
        .route("/health", get(handlers::health))
        .merge(routes::api_routes())
        .fallback(handlers::not_found)
        .layer(middleware::map_response(handlers::json_method_not_allowed))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

pub async fn run_server(pool: Pool<Sqlite>, config: Config) -> Result<()> {
    let addr = config.bind_address();
    let app = build_router(AppState::new(pool, config))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
