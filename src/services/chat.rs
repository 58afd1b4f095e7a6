//! 对话服务
//!
//! 串联一轮对话：组装上下文、调用 LLM、把回复写回会话记忆；
//! 以及从一问一答中抽取标签写入知识图谱。

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::metadata::PairMetadata;
use crate::models::turn::Role;
use crate::observability::AppMetrics;
use crate::services::composer::ContextComposer;
use crate::services::extractor::MetadataExtractor;
use crate::services::llm::LlmGateway;
use crate::services::memory::ConversationMemory;
use crate::storage::repository::KnowledgeStore;

/// 对话服务
pub struct ChatService {
    composer: ContextComposer,
    gateway: Arc<dyn LlmGateway>,
    extractor: Arc<MetadataExtractor>,
    store: Arc<dyn KnowledgeStore>,
    memory: Arc<ConversationMemory>,
    metrics: Arc<AppMetrics>,
}

impl ChatService {
    pub fn new(
        composer: ContextComposer,
        gateway: Arc<dyn LlmGateway>,
        extractor: Arc<MetadataExtractor>,
        store: Arc<dyn KnowledgeStore>,
        memory: Arc<ConversationMemory>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            composer,
            gateway,
            extractor,
            store,
            memory,
            metrics,
        }
    }

    /// 处理一轮对话，返回助手回复
    ///
    /// LLM 调用失败时当前用户消息已写入记忆，错误原样返回，由调用方决定是否重试。
    pub async fn chat(&self, session_id: &str, user_name: &str, input: &str) -> Result<String> {
        if input.trim().is_empty() {
            return Err(AppError::Validation("user_input must not be empty".to_string()));
        }

        let composed = self.composer.compose(session_id, input, user_name).await;
        if composed.metadata.is_fallback() {
            self.metrics.record_extraction_fallback();
        }
        if composed.profile_degraded {
            self.metrics.record_store_failure();
        }

        let reply = match self.gateway.complete(&composed.messages).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(session = %session_id, error = %e, "Chat completion failed");
                self.metrics.record_gateway_error();
                return Err(e);
            }
        };

        self.memory.append_turn(session_id, Role::Assistant, &reply);
        self.metrics.record_chat_turn();

        info!(
            session = %session_id,
            user = %user_name,
            reply_chars = reply.len(),
            "Chat turn completed"
        );
        Ok(reply)
    }

    /// 从助手消息与用户回复中抽取标签并写入用户知识图谱
    pub async fn update_knowledge(
        &self,
        user_name: &str,
        assistant_msg: &str,
        user_msg: &str,
    ) -> Result<PairMetadata> {
        let extraction = self.extractor.extract_pair(assistant_msg, user_msg).await;
        if extraction.is_fallback() {
            self.metrics.record_extraction_fallback();
        }
        let metadata = extraction.into_inner();

        if let Err(e) = self.store.upsert_tags(user_name, &metadata).await {
            self.metrics.record_store_failure();
            return Err(e);
        }

        info!(
            user = %user_name,
            topic = %metadata.topic,
            sentiment = %metadata.normalized_sentiment(),
            "Knowledge graph updated"
        );
        Ok(metadata)
    }

    /// 确保用户节点存在
    pub async fn init_user(&self, user_name: &str) -> Result<()> {
        self.store.ensure_user(user_name).await.inspect_err(|_| {
            self.metrics.record_store_failure();
        })
    }
}
