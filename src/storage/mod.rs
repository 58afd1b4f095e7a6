//! 存储层模块
//!
//! 提供用户知识图谱的持久化，支持 SurrealDB 和进程内存储。

#[cfg(feature = "surrealdb")]
pub mod surrealdb;

pub mod factory;
pub mod in_memory;
pub mod repository;

pub use factory::create_knowledge_store;
pub use in_memory::InMemoryKnowledgeStore;
pub use repository::KnowledgeStore;
