//! 上下文组装服务
//!
//! 为一轮对话生成发送给 LLM 的有序消息序列：
//!
//! ```text
//! [画像系统消息, (可选) 查询分析系统消息, ...最近历史（从旧到新）, 当前用户消息]
//! ```
//!
//! 抽取失败和存储失败都会被吸收并降级，组装本身不会失败。

use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::memory::MemorySnapshot;
use crate::models::metadata::QueryMetadata;
use crate::models::profile::{ProfileCategory, ProfileContext};
use crate::models::prompt::PromptMessage;
use crate::models::turn::Role;
use crate::services::extractor::{Extraction, MetadataExtractor};
use crate::services::memory::ConversationMemory;
use crate::storage::repository::KnowledgeStore;

/// 没有任何已知画像时使用的系统消息
pub const NO_PROFILE_INSTRUCTION: &str = "You are a helpful assistant. Since I don't have specific information about the user yet, I'll ask questions to better understand their needs and preferences.";

/// 附加在画像之后，限制模型只引用给定事实
pub const PROFILE_RESTRICTION: &str = "IMPORTANT: Only reference information from the user context above. If you don't have specific information about the user, ask for clarification rather than making assumptions.";

/// 组装结果
#[derive(Debug, Clone)]
pub struct ComposedPrompt {
    /// 发送给 LLM 的消息
    pub messages: Vec<PromptMessage>,
    /// 查询元数据抽取结果
    pub metadata: Extraction<QueryMetadata>,
    /// 画像读取失败并降级为空画像
    pub profile_degraded: bool,
}

/// 上下文组装器
pub struct ContextComposer {
    extractor: Arc<MetadataExtractor>,
    store: Arc<dyn KnowledgeStore>,
    memory: Arc<ConversationMemory>,
    history_limit: usize,
}

impl ContextComposer {
    pub fn new(
        extractor: Arc<MetadataExtractor>,
        store: Arc<dyn KnowledgeStore>,
        memory: Arc<ConversationMemory>,
    ) -> Self {
        let history_limit = memory.config().history_limit;
        Self {
            extractor,
            store,
            memory,
            history_limit,
        }
    }

    /// 覆盖历史截断上限
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// 组装一轮对话的消息序列，并把当前查询写入会话记忆
    pub async fn compose(&self, key: &str, query: &str, user_id: &str) -> ComposedPrompt {
        let metadata = self.extractor.extract_query(query).await;
        let wants_profile = metadata
            .as_extracted()
            .map(|m| m.use_long_term_memory)
            .unwrap_or(false);

        let mut profile_degraded = false;
        let profile = if wants_profile {
            let topic_hint = metadata.as_extracted().and_then(QueryMetadata::topic_hint);
            match self.store.fetch_profile(user_id, topic_hint).await {
                Ok(profile) => profile,
                Err(e) => {
                    warn!(user = %user_id, error = %e, "Profile lookup failed, continuing without it");
                    profile_degraded = true;
                    ProfileContext::default()
                }
            }
        } else {
            ProfileContext::default()
        };

        let mut messages = Vec::new();
        messages.push(PromptMessage::system(system_instruction(&profile)));

        if let Some(analysis) = metadata.as_extracted().and_then(query_analysis) {
            messages.push(PromptMessage::system(analysis));
        }

        // 先读历史再写入当前查询，当前查询只出现在末尾一次
        let snapshot: MemorySnapshot = self.memory.read_memory(key);
        let history = snapshot.recent_turns(self.history_limit);
        messages.extend(history.iter().map(PromptMessage::from));
        messages.push(PromptMessage::user(query));

        self.memory.append_turn(key, Role::User, query);

        debug!(
            key = %key,
            user = %user_id,
            history = history.len(),
            messages = messages.len(),
            fallback = metadata.is_fallback(),
            "Prompt composed"
        );

        ComposedPrompt {
            messages,
            metadata,
            profile_degraded,
        }
    }
}

/// 画像非空时渲染画像与限制说明，否则返回固定说明
pub fn system_instruction(profile: &ProfileContext) -> String {
    if profile.is_empty() {
        return NO_PROFILE_INSTRUCTION.to_string();
    }
    format!("{}\n\n{}", render_profile(profile), PROFILE_RESTRICTION)
}

/// 按固定类别顺序渲染画像，空类别省略
pub fn render_profile(profile: &ProfileContext) -> String {
    let mut lines = vec!["User profile:".to_string()];

    for category in ProfileCategory::ALL {
        let values = profile.values(category);
        if values.is_empty() {
            continue;
        }
        let joined = values.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        let label = match category {
            ProfileCategory::Interest => "Interested in",
            ProfileCategory::Skill => "Has skills in",
            ProfileCategory::PersonalityTrait => "Prefers",
            ProfileCategory::Topic => "Has talked about",
        };
        lines.push(format!("- {} {}", label, joined));
    }

    lines.join("\n")
}

fn query_analysis(metadata: &QueryMetadata) -> Option<String> {
    if !metadata.is_meaningful() {
        return None;
    }
    Some(format!(
        "Query analysis: Intent={}, Topic={}",
        metadata.intent.trim(),
        metadata.topic.trim()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_profile_order() {
        let mut profile = ProfileContext::default();
        profile.insert(ProfileCategory::Topic, "LangGraph");
        profile.insert(ProfileCategory::Skill, "Rust");
        profile.insert(ProfileCategory::Skill, "Python");
        profile.insert(ProfileCategory::Interest, "agents");

        assert_eq!(
            render_profile(&profile),
            "User profile:\n- Interested in agents\n- Has skills in Python, Rust\n- Has talked about LangGraph"
        );
    }

    #[test]
    fn test_system_instruction_without_profile() {
        assert_eq!(
            system_instruction(&ProfileContext::default()),
            NO_PROFILE_INSTRUCTION
        );
    }

    #[test]
    fn test_system_instruction_with_profile() {
        let mut profile = ProfileContext::default();
        profile.insert(ProfileCategory::PersonalityTrait, "concise answers");

        let text = system_instruction(&profile);
        assert!(text.starts_with("User profile:\n- Prefers concise answers"));
        assert!(text.ends_with(PROFILE_RESTRICTION));
    }

    #[test]
    fn test_query_analysis_requires_content() {
        let blank = QueryMetadata {
            intent: " ".into(),
            topic: String::new(),
            ..QueryMetadata::default()
        };
        assert!(query_analysis(&blank).is_none());

        let metadata = QueryMetadata {
            intent: "coding_question".into(),
            topic: "Rust".into(),
            ..QueryMetadata::default()
        };
        assert_eq!(
            query_analysis(&metadata).unwrap(),
            "Query analysis: Intent=coding_question, Topic=Rust"
        );
    }
}
