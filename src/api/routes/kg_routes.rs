//! Knowledge Graph Routes
//!
//! 定义对话与知识图谱编辑的 API 路由。

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::api::app_state::AppState;
use crate::api::handlers::kg_handler::*;

/// 创建知识图谱路由器
pub fn create_kg_router() -> Router<AppState> {
    Router::new()
        .route("/kg/init", post(init_user))
        .route("/kg/chat", post(chat))
        .route("/kg/update", post(update_knowledge).put(update_item))
        .route("/kg/view/:user_name", get(view_profile))
        .route("/kg/add", post(add_item))
        .route("/kg/delete", delete(delete_item))
}
