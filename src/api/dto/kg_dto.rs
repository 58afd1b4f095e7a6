//! 知识图谱 DTO
//!
//! 定义 `/kg` 路由的请求和响应数据结构。

use serde::{Deserialize, Serialize};

use crate::models::metadata::PairMetadata;
use crate::models::profile::{ProfileCategory, ProfileContext};

/// 初始化用户请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitUserRequest {
    pub user_name: String,
}

/// 通用消息响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// 对话请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// 会话键
    pub session_id: String,
    /// 用户名（知识图谱中的用户节点）
    pub user_name: String,
    /// 用户输入
    pub user_input: String,
}

/// 对话响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}

/// 消息对更新请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePairRequest {
    pub user_name: String,
    pub assistant_msg: String,
    pub user_msg: String,
}

/// 消息对更新响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateKnowledgeResponse {
    pub updated_metadata: PairMetadata,
}

/// 用户画像视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub user_name: String,
    pub interests: Vec<String>,
    pub skills: Vec<String>,
    pub personality_traits: Vec<String>,
    pub topics: Vec<String>,
}

impl ProfileView {
    pub fn new(user_name: &str, profile: ProfileContext) -> Self {
        Self {
            user_name: user_name.to_string(),
            interests: profile.interests.into_iter().collect(),
            skills: profile.skills.into_iter().collect(),
            personality_traits: profile.personality_traits.into_iter().collect(),
            topics: profile.topics.into_iter().collect(),
        }
    }
}

/// 添加/删除条目请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KgItemRequest {
    pub user_name: String,
    /// interest / skill / topic / personality_trait
    pub field: ProfileCategory,
    pub value: String,
}

/// 更新条目请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateKgItemRequest {
    pub user_name: String,
    pub field: ProfileCategory,
    pub old_value: String,
    pub new_value: String,
}

/// 条目操作响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KgItemResponse {
    /// added / updated / deleted
    pub status: String,
    pub field: ProfileCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

impl KgItemResponse {
    pub fn added(field: ProfileCategory, value: String) -> Self {
        Self::single("added", field, value)
    }

    pub fn deleted(field: ProfileCategory, value: String) -> Self {
        Self::single("deleted", field, value)
    }

    pub fn updated(field: ProfileCategory, old_value: String, new_value: String) -> Self {
        Self {
            status: "updated".to_string(),
            field,
            value: None,
            old_value: Some(old_value),
            new_value: Some(new_value),
        }
    }

    fn single(status: &str, field: ProfileCategory, value: String) -> Self {
        Self {
            status: status.to_string(),
            field,
            value: Some(value),
            old_value: None,
            new_value: None,
        }
    }
}
