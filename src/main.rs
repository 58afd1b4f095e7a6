use anyhow::Context;
use kgchat::api::{self, app_state::AppState};
use kgchat::config::loader::{ConfigLoader, config_exists, default_config_path};
use kgchat::observability::{AppMetrics, init_tracing};
use kgchat::services::{
    ChatService, ContextComposer, ConversationMemory, MetadataExtractor, OpenAiGateway,
    RetryPolicy,
};
use kgchat::storage::create_knowledge_store;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;
    ConfigLoader::validate(&config).context("invalid configuration")?;

    let _log_guard = init_tracing(&config.logging)?;
    info!(
        app = %config.app_name,
        environment = %config.environment,
        "Starting KgChat..."
    );
    if !config_exists() {
        info!(
            path = %default_config_path().display(),
            "Config file not found, using defaults and environment"
        );
    }

    let store = create_knowledge_store(&config.database).await?;
    info!(backend = %config.database.backend, "Knowledge store initialized");

    let memory = Arc::new(ConversationMemory::new(config.memory.clone()));
    spawn_memory_sweeper(memory.clone());

    if config.llm.api_key.is_empty() {
        warn!("No LLM API key configured; set KGCHAT_LLM__API_KEY or OPENAI_API_KEY");
    }
    let gateway = Arc::new(OpenAiGateway::new(config.llm.clone())?);
    info!(model = %config.llm.model, base_url = %config.llm.base_url, "LLM gateway initialized");

    let extractor = Arc::new(MetadataExtractor::new(
        gateway.clone(),
        RetryPolicy::from(&config.extractor),
    ));
    let composer = ContextComposer::new(extractor.clone(), store.clone(), memory.clone());

    let metrics = Arc::new(AppMetrics::default());
    let chat_service = ChatService::new(
        composer,
        gateway,
        extractor,
        store.clone(),
        memory.clone(),
        metrics.clone(),
    );

    let app_state = AppState::new(memory, store, chat_service, metrics);
    let router = api::create_router(app_state, &config.server);
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// 配置了空闲过期时间时，周期性清理过期会话
fn spawn_memory_sweeper(memory: Arc<ConversationMemory>) {
    if memory.config().idle_ttl_secs.is_none() {
        return;
    }

    let period = Duration::from_secs(memory.config().sweep_interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            memory.purge_expired();
        }
    });
    info!(interval_secs = period.as_secs(), "Memory sweeper started");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
