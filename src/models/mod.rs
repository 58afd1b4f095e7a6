//! 核心数据模型模块
//!
//! 定义对话轮次、会话记忆快照、用户画像、抽取元数据和提示词消息。

pub mod memory;
pub mod metadata;
pub mod profile;
pub mod prompt;
pub mod turn;

pub use memory::*;
pub use metadata::*;
pub use profile::*;
pub use prompt::*;
pub use turn::*;
