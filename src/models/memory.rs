//! 会话记忆数据模型
//!
//! 定义保留策略和记忆快照。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::turn::Turn;

/// 记忆保留策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemoryPolicy {
    /// 保留最近固定条数（由管理器统一配置）
    #[default]
    Buffer,
    /// 滑动窗口，超出窗口的轮次直接丢弃
    Window,
    /// 滚动摘要，超出窗口的轮次折叠进摘要文本
    Summary,
}

impl MemoryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryPolicy::Buffer => "buffer",
            MemoryPolicy::Window => "window",
            MemoryPolicy::Summary => "summary",
        }
    }
}

impl fmt::Display for MemoryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buffer" => Ok(MemoryPolicy::Buffer),
            "window" => Ok(MemoryPolicy::Window),
            "summary" => Ok(MemoryPolicy::Summary),
            other => Err(AppError::InvalidPolicy(other.to_string())),
        }
    }
}

/// 会话记忆快照
///
/// 对不存在的会话返回空快照：`policy` 为 `None`、无轮次、摘要为空。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MemorySnapshot {
    /// 保留策略
    pub policy: Option<MemoryPolicy>,
    /// 窗口大小
    pub window_size: Option<usize>,
    /// 轮次（从旧到新）
    pub turns: Vec<Turn>,
    /// 滚动摘要
    pub rolling_summary: String,
}

impl MemorySnapshot {
    pub fn is_empty(&self) -> bool {
        self.policy.is_none() && self.turns.is_empty() && self.rolling_summary.is_empty()
    }

    /// 最近 `limit` 条轮次，保持从旧到新的顺序
    pub fn recent_turns(&self, limit: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(limit);
        &self.turns[start..]
    }
}
