//! Knowledge Graph API Handlers
//!
//! HTTP handlers for chat turns and user knowledge graph editing.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::kg_dto::*},
    error::AppError,
};

fn require_user(user_name: &str) -> Result<(), AppError> {
    if user_name.trim().is_empty() {
        return Err(AppError::Validation("user_name cannot be empty".to_string()));
    }
    Ok(())
}

/// POST /kg/init
pub async fn init_user(
    State(state): State<AppState>,
    Json(request): Json<InitUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&request.user_name)?;
    state.chat_service.init_user(&request.user_name).await?;

    Ok(Json(MessageResponse {
        message: format!("Knowledge graph initialized for {}", request.user_name),
    }))
}

/// POST /kg/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Chat turn for session: {}", request.session_id);

    if request.session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id cannot be empty".to_string()));
    }
    require_user(&request.user_name)?;

    let response = state
        .chat_service
        .chat(&request.session_id, &request.user_name, &request.user_input)
        .await?;

    Ok(Json(ChatResponse {
        response,
        session_id: request.session_id,
    }))
}

/// POST /kg/update
pub async fn update_knowledge(
    State(state): State<AppState>,
    Json(request): Json<MessagePairRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&request.user_name)?;

    let updated_metadata = state
        .chat_service
        .update_knowledge(&request.user_name, &request.assistant_msg, &request.user_msg)
        .await?;

    Ok(Json(UpdateKnowledgeResponse { updated_metadata }))
}

/// GET /kg/view/:user_name
pub async fn view_profile(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Fetching knowledge graph for user: {}", user_name);

    let profile = state.store.view(&user_name).await?;
    Ok(Json(ProfileView::new(&user_name, profile)))
}

/// POST /kg/add
pub async fn add_item(
    State(state): State<AppState>,
    Json(request): Json<KgItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&request.user_name)?;
    if request.value.trim().is_empty() {
        return Err(AppError::Validation("value cannot be empty".to_string()));
    }

    state
        .store
        .add_item(&request.user_name, request.field, &request.value)
        .await?;

    Ok(Json(KgItemResponse::added(request.field, request.value)))
}

/// PUT /kg/update
pub async fn update_item(
    State(state): State<AppState>,
    Json(request): Json<UpdateKgItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&request.user_name)?;
    if request.new_value.trim().is_empty() {
        return Err(AppError::Validation("new_value cannot be empty".to_string()));
    }

    let found = state
        .store
        .update_item(
            &request.user_name,
            request.field,
            &request.old_value,
            &request.new_value,
        )
        .await?;

    if !found {
        return Err(AppError::NotFound(format!(
            "{} '{}' not found for {}",
            request.field, request.old_value, request.user_name
        )));
    }

    Ok(Json(KgItemResponse::updated(
        request.field,
        request.old_value,
        request.new_value,
    )))
}

/// DELETE /kg/delete
pub async fn delete_item(
    State(state): State<AppState>,
    Json(request): Json<KgItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&request.user_name)?;

    let found = state
        .store
        .delete_item(&request.user_name, request.field, &request.value)
        .await?;

    if !found {
        return Err(AppError::NotFound(format!(
            "{} '{}' not found for {}",
            request.field, request.value, request.user_name
        )));
    }

    Ok(Json(KgItemResponse::deleted(request.field, request.value)))
}
