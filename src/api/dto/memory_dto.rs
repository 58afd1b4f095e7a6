//! 会话记忆 DTO
//!
//! API 请求和响应的数据传输对象

use serde::{Deserialize, Serialize};

use crate::models::memory::MemorySnapshot;
use crate::models::turn::Role;

/// 设置记忆策略请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPolicyRequest {
    /// buffer / window / summary
    pub policy: String,
    /// 窗口大小，缺省使用配置中的默认值
    pub window_size: Option<usize>,
}

/// 追加轮次请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendTurnRequest {
    pub role: Role,
    pub content: String,
}

/// 会话记忆响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryResponse {
    pub key: String,
    #[serde(flatten)]
    pub snapshot: MemorySnapshot,
}

impl MemoryResponse {
    pub fn new(key: &str, snapshot: MemorySnapshot) -> Self {
        Self {
            key: key.to_string(),
            snapshot,
        }
    }
}

/// 删除记忆响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearMemoryResponse {
    pub key: String,
    pub cleared: bool,
}
