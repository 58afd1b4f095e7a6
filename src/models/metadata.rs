//! 抽取元数据模型
//!
//! `Default` 即抽取失败时的确定性回退值。

use serde::{Deserialize, Serialize};

use crate::models::profile::{ProfileCategory, ProfileContext};

/// 单条查询的结构化元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryMetadata {
    /// 查询意图（ask_question、coding_question、unclear 等）
    pub intent: String,
    /// 主题
    pub topic: String,
    /// 明确提到的实体
    pub entities: Vec<String>,
    pub interests: Vec<String>,
    pub skills: Vec<String>,
    pub personality_traits: Vec<String>,
    /// 是否需要用户长期画像
    #[serde(alias = "use_KG", alias = "use_kg")]
    pub use_long_term_memory: bool,
}

impl Default for QueryMetadata {
    fn default() -> Self {
        Self {
            intent: "unclear".to_string(),
            topic: "unknown".to_string(),
            entities: Vec::new(),
            interests: Vec::new(),
            skills: Vec::new(),
            personality_traits: Vec::new(),
            use_long_term_memory: false,
        }
    }
}

impl QueryMetadata {
    /// 可用作画像检索提示的主题
    pub fn topic_hint(&self) -> Option<&str> {
        let topic = self.topic.trim();
        if topic.is_empty() || topic.eq_ignore_ascii_case("unknown") {
            None
        } else {
            Some(topic)
        }
    }

    /// 意图或主题至少有一个非空
    pub fn is_meaningful(&self) -> bool {
        !self.intent.trim().is_empty() || !self.topic.trim().is_empty()
    }
}

/// 助手消息与用户回复组成的消息对的元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairMetadata {
    pub topic: String,
    pub interests: Vec<String>,
    pub skills: Vec<String>,
    pub personality_traits: Vec<String>,
    /// positive / neutral / negative / none
    pub feedback_sentiment: String,
}

impl Default for PairMetadata {
    fn default() -> Self {
        Self {
            topic: "unknown".to_string(),
            interests: Vec::new(),
            skills: Vec::new(),
            personality_traits: Vec::new(),
            feedback_sentiment: "none".to_string(),
        }
    }
}

impl PairMetadata {
    /// 转换为待写入图谱的标签；主题为 `unknown` 时不写入话题
    pub fn to_profile(&self) -> ProfileContext {
        let mut profile = ProfileContext::default();
        for value in &self.interests {
            profile.insert(ProfileCategory::Interest, value);
        }
        for value in &self.skills {
            profile.insert(ProfileCategory::Skill, value);
        }
        for value in &self.personality_traits {
            profile.insert(ProfileCategory::PersonalityTrait, value);
        }
        let topic = self.topic.trim();
        if !topic.eq_ignore_ascii_case("unknown") {
            profile.insert(ProfileCategory::Topic, topic);
        }
        profile
    }

    /// 情感取值归一化，未知值视为 `none`
    pub fn normalized_sentiment(&self) -> &'static str {
        match self.feedback_sentiment.trim().to_ascii_lowercase().as_str() {
            "positive" => "positive",
            "neutral" => "neutral",
            "negative" => "negative",
            _ => "none",
        }
    }
}
