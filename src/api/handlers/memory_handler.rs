//! Memory API Handlers
//!
//! HTTP handlers for per-session conversation memory.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::memory_dto::*},
    error::AppError,
    models::memory::MemoryPolicy,
};

/// PUT /memory/:key/policy
pub async fn set_policy(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<SetPolicyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let policy: MemoryPolicy = request.policy.parse()?;
    state.memory.set_policy(&key, policy, request.window_size)?;

    Ok(Json(MemoryResponse::new(&key, state.memory.read_memory(&key))))
}

/// GET /memory/:key
pub async fn get_memory(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Reading memory: {}", key);
    Ok(Json(MemoryResponse::new(&key, state.memory.read_memory(&key))))
}

/// POST /memory/:key/turns
pub async fn append_turn(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<AppendTurnRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.memory.append_turn(&key, request.role, &request.content);

    Ok((
        StatusCode::CREATED,
        Json(MemoryResponse::new(&key, state.memory.read_memory(&key))),
    ))
}

/// DELETE /memory/:key
pub async fn clear_memory(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let cleared = state.memory.clear(&key);
    Ok(Json(ClearMemoryResponse { key, cleared }))
}
