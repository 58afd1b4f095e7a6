//! API 模块
//!
//! 提供 REST API 支持。

pub mod app_state;
pub mod dto;
pub mod handlers;
pub mod routes;

use crate::api::app_state::AppState;
use crate::config::ServerConfig;
use crate::observability::{ObservabilityState, create_observability_router, metrics_middleware};
use axum::{
    Router,
    http::HeaderValue,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// 构建跨域配置，`*` 表示允许任意来源
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_router(app_state: AppState, server: &ServerConfig) -> Router {
    let observability_state = Arc::new(ObservabilityState::new(
        app_state.metrics.clone(),
        app_state.memory.clone(),
        app_state.store.clone(),
        env!("CARGO_PKG_VERSION").to_string(),
    ));
    let metrics = app_state.metrics.clone();

    Router::new()
        .merge(routes::kg_routes::create_kg_router())
        .merge(routes::memory_routes::create_memory_router())
        .with_state(app_state)
        .merge(create_observability_router(observability_state))
        .layer(axum::middleware::from_fn_with_state(metrics, metrics_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout.max(1))))
        .layer(cors_layer(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
}
