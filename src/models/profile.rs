//! 用户画像数据模型
//!
//! 知识图谱中与用户相连的四类节点：兴趣、技能、性格特征、话题。

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// 画像类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileCategory {
    /// 兴趣
    Interest,
    /// 技能
    Skill,
    /// 性格特征 / 沟通偏好
    PersonalityTrait,
    /// 聊过的话题
    Topic,
}

impl ProfileCategory {
    /// 固定的渲染顺序
    pub const ALL: [ProfileCategory; 4] = [
        ProfileCategory::Interest,
        ProfileCategory::Skill,
        ProfileCategory::PersonalityTrait,
        ProfileCategory::Topic,
    ];

    /// 请求体中的字段名
    pub fn field(&self) -> &'static str {
        match self {
            ProfileCategory::Interest => "interest",
            ProfileCategory::Skill => "skill",
            ProfileCategory::PersonalityTrait => "personality_trait",
            ProfileCategory::Topic => "topic",
        }
    }

    /// 图节点表
    pub fn node_table(&self) -> &'static str {
        match self {
            ProfileCategory::Interest => "interest",
            ProfileCategory::Skill => "skill",
            ProfileCategory::PersonalityTrait => "personality",
            ProfileCategory::Topic => "topic",
        }
    }

    /// 用户指向该类节点的边表
    pub fn edge_table(&self) -> &'static str {
        match self {
            ProfileCategory::Interest => "has_interest",
            ProfileCategory::Skill => "has_skill",
            ProfileCategory::PersonalityTrait => "has_personality_trait",
            ProfileCategory::Topic => "mentioned_topic",
        }
    }
}

impl fmt::Display for ProfileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// 画像上下文
///
/// 每个类别是去重后的字符串集合；`BTreeSet` 保证渲染顺序稳定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProfileContext {
    pub interests: BTreeSet<String>,
    pub skills: BTreeSet<String>,
    pub personality_traits: BTreeSet<String>,
    pub topics: BTreeSet<String>,
}

impl ProfileContext {
    pub fn values(&self, category: ProfileCategory) -> &BTreeSet<String> {
        match category {
            ProfileCategory::Interest => &self.interests,
            ProfileCategory::Skill => &self.skills,
            ProfileCategory::PersonalityTrait => &self.personality_traits,
            ProfileCategory::Topic => &self.topics,
        }
    }

    pub fn values_mut(&mut self, category: ProfileCategory) -> &mut BTreeSet<String> {
        match category {
            ProfileCategory::Interest => &mut self.interests,
            ProfileCategory::Skill => &mut self.skills,
            ProfileCategory::PersonalityTrait => &mut self.personality_traits,
            ProfileCategory::Topic => &mut self.topics,
        }
    }

    /// 添加一个值，空白值被忽略。返回是否新增
    pub fn insert(&mut self, category: ProfileCategory, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        self.values_mut(category).insert(value.to_string())
    }

    /// 所有类别均为空
    pub fn is_empty(&self) -> bool {
        ProfileCategory::ALL
            .iter()
            .all(|category| self.values(*category).is_empty())
    }

    /// 话题只保留名称包含 `hint` 的条目（不区分大小写）
    pub fn restrict_topics(&mut self, hint: &str) {
        let hint = hint.to_lowercase();
        self.topics.retain(|topic| topic.to_lowercase().contains(&hint));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_dedups_and_trims() {
        let mut profile = ProfileContext::default();
        assert!(profile.insert(ProfileCategory::Skill, "Rust"));
        assert!(!profile.insert(ProfileCategory::Skill, " Rust "));
        assert!(!profile.insert(ProfileCategory::Skill, "   "));
        assert_eq!(profile.skills.len(), 1);
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_restrict_topics() {
        let mut profile = ProfileContext::default();
        profile.insert(ProfileCategory::Topic, "LangGraph agents");
        profile.insert(ProfileCategory::Topic, "Cooking");
        profile.insert(ProfileCategory::Interest, "graphs");

        profile.restrict_topics("langgraph");
        assert_eq!(profile.topics.len(), 1);
        assert!(profile.topics.contains("LangGraph agents"));
        // 其他类别不受影响
        assert_eq!(profile.interests.len(), 1);
    }

    #[test]
    fn test_category_serde_names() {
        let category: ProfileCategory = serde_json::from_str("\"personality_trait\"").unwrap();
        assert_eq!(category, ProfileCategory::PersonalityTrait);
        assert_eq!(category.edge_table(), "has_personality_trait");
    }
}
