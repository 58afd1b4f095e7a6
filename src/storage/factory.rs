//! 存储工厂模块
//!
//! 根据配置创建相应的知识存储实例。

use std::sync::Arc;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::storage::in_memory::InMemoryKnowledgeStore;
use crate::storage::repository::KnowledgeStore;

#[cfg(feature = "surrealdb")]
use crate::storage::surrealdb::{SurrealKnowledgeStore, SurrealPool};

/// 根据 `backend` 创建知识存储
pub async fn create_knowledge_store(config: &DatabaseConfig) -> Result<Arc<dyn KnowledgeStore>> {
    match config.backend.as_str() {
        "memory" => {
            info!("Using in-memory knowledge store");
            Ok(Arc::new(InMemoryKnowledgeStore::new()))
        }
        "surrealdb" => create_surrealdb(config).await,
        other => Err(AppError::Config(format!("unknown storage backend: {}", other))),
    }
}

#[cfg(feature = "surrealdb")]
async fn create_surrealdb(config: &DatabaseConfig) -> Result<Arc<dyn KnowledgeStore>> {
    let pool = SurrealPool::new(config.clone()).await?;
    info!(
        url = %config.url,
        namespace = %config.namespace,
        database = %config.database,
        "Connected to SurrealDB knowledge store"
    );
    Ok(Arc::new(SurrealKnowledgeStore::new(pool)))
}

#[cfg(not(feature = "surrealdb"))]
async fn create_surrealdb(_config: &DatabaseConfig) -> Result<Arc<dyn KnowledgeStore>> {
    Err(AppError::Config(
        "SurrealDB feature is not enabled. Enable 'surrealdb' feature or use the memory backend."
            .into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend() {
        let config = DatabaseConfig {
            backend: "memory".into(),
            ..DatabaseConfig::default()
        };
        let store = create_knowledge_store(&config).await.unwrap();
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_backend() {
        let config = DatabaseConfig {
            backend: "arangodb".into(),
            ..DatabaseConfig::default()
        };
        let result = create_knowledge_store(&config).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
