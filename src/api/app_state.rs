use crate::observability::AppMetrics;
use crate::services::chat::ChatService;
use crate::services::memory::ConversationMemory;
use crate::storage::repository::KnowledgeStore;
use std::sync::Arc;

/// Application state containing all shared services
#[derive(Clone)]
pub struct AppState {
    /// Conversation memory shared by every session
    pub memory: Arc<ConversationMemory>,
    /// Knowledge graph store
    pub store: Arc<dyn KnowledgeStore>,
    /// Chat turn orchestration
    pub chat_service: Arc<ChatService>,
    /// Application metrics
    pub metrics: Arc<AppMetrics>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("memory_records", &self.memory.len())
            .field("store", &"Arc<dyn KnowledgeStore>")
            .field("chat_service", &"Arc<ChatService>")
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(
        memory: Arc<ConversationMemory>,
        store: Arc<dyn KnowledgeStore>,
        chat_service: ChatService,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            memory,
            store,
            chat_service: Arc::new(chat_service),
            metrics,
        }
    }
}
