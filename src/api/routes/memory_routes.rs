//! Memory Routes
//!
//! 定义会话记忆相关的 API 路由。

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::api::app_state::AppState;
use crate::api::handlers::memory_handler::*;

/// 创建记忆路由器
pub fn create_memory_router() -> Router<AppState> {
    Router::new()
        .route("/memory/:key", get(get_memory).delete(clear_memory))
        .route("/memory/:key/policy", put(set_policy))
        .route("/memory/:key/turns", post(append_turn))
}
