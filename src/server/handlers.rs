//! Route handlers. Each maps a JSON body onto a [`MemoryService`] call.
//!
//! [`MemoryService`]: crate::service::MemoryService

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::service::{RememberError, SavedNote};

#[derive(Debug, Deserialize)]
pub struct RememberRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct RemindRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub system: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online",
        system: "DontForget",
    })
}

// POST /remember
pub async fn remember(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RememberRequest>,
) -> Result<Json<SavedNote>, ApiError> {
    match state.service.remember(&req.text).await {
        Ok(saved) => Ok(Json(saved)),
        Err(RememberError::InvalidNote(e)) => Err(ApiError::BadRequest(e.to_string())),
        Err(e) => {
            tracing::error!(error = %e, "remember failed");
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

// POST /remind
pub async fn remind(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RemindRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    match state.service.remind(&req.question).await {
        Ok(answer) => Ok(Json(AnswerResponse { answer: answer.text })),
        Err(e) => {
            tracing::error!(error = %e, "remind failed");
            Err(ApiError::RetrievalFailed)
        }
    }
}
