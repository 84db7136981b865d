//! HTTP server: router construction and the [`serve`] entry point.
//!
//! Every route sits behind the shared-secret middleware in [`auth`]. Errors
//! leave as `{"detail": ...}` bodies; recall failures never expose their cause.

pub mod auth;
pub mod handlers;

use anyhow::Result;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

use crate::config::{DontForgetConfig, Secrets};
use crate::service::MemoryService;

pub struct AppState {
    pub service: Arc<MemoryService>,
    pub secret: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid API Key. You are not the owner.")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
    #[error("Memory retrieval failed.")]
    RetrievalFailed,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) | Self::RetrievalFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Build the router with auth applied to every route.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/remember", post(handlers::remember))
        .route("/remind", post(handlers::remind))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_api_key,
        ))
        .with_state(state)
}

/// Open the store, wire the service, and serve HTTP until Ctrl-C.
pub async fn serve(config: DontForgetConfig, secrets: Secrets) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let service = MemoryService::from_config(&config, &secrets.engine_api_key)?;
    tracing::info!(
        db = %config.resolved_db_path().display(),
        model = %config.model.model,
        "memory service ready"
    );

    let state = Arc::new(AppState {
        service: Arc::new(service),
        secret: secrets.server_secret,
    });
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "DontForget listening at http://{bind_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
