//! KgChat - 知识图谱增强的对话服务
//!
//! 按会话保存对话记忆（Buffer / Window / Summary 三种保留策略），
//! 结合用户知识图谱中的兴趣、技能、性格特征和话题，为每轮对话组装 LLM 上下文。

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;
