//! 会话记忆服务
//!
//! 按会话键保存有序轮次，支持 Buffer / Window / Summary 三种保留策略。
//! 全部操作在进程内同步完成，不做任何 I/O。
//!
//! 同一会话键的追加、裁剪、折叠在 `DashMap` 分片写锁内完成，
//! 因此并发追加不会出现重复、丢失或乱序；不同会话键互不影响。

use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::MemoryConfig;
use crate::error::{AppError, Result};
use crate::models::memory::{MemoryPolicy, MemorySnapshot};
use crate::models::turn::{Role, Turn};

/// 单个会话的记忆记录
#[derive(Debug)]
struct MemoryRecord {
    policy: MemoryPolicy,
    window_size: usize,
    turns: VecDeque<Turn>,
    rolling_summary: String,
    last_touched: Instant,
}

impl MemoryRecord {
    fn new(policy: MemoryPolicy, window_size: usize) -> Self {
        Self {
            policy,
            window_size,
            turns: VecDeque::new(),
            rolling_summary: String::new(),
            last_touched: Instant::now(),
        }
    }

    /// 追加轮次并执行策略维护
    fn push(&mut self, turn: Turn, buffer_max_turns: usize) {
        self.turns.push_back(turn);
        self.last_touched = Instant::now();

        match self.policy {
            MemoryPolicy::Buffer => self.trim_to(buffer_max_turns),
            MemoryPolicy::Window => self.trim_to(self.window_size),
            MemoryPolicy::Summary => self.fold_overflow(),
        }
    }

    fn trim_to(&mut self, capacity: usize) {
        while self.turns.len() > capacity {
            self.turns.pop_front();
        }
    }

    /// 把超出窗口的最旧轮次按空格拼接追加到摘要，摘要只增不减
    fn fold_overflow(&mut self) {
        if self.turns.len() <= self.window_size {
            return;
        }

        let excess = self.turns.len() - self.window_size;
        let folded = self
            .turns
            .drain(..excess)
            .map(|turn| turn.content)
            .collect::<Vec<_>>()
            .join(" ");

        if !self.rolling_summary.is_empty() {
            self.rolling_summary.push(' ');
        }
        self.rolling_summary.push_str(&folded);
    }

    fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            policy: Some(self.policy),
            window_size: Some(self.window_size),
            turns: self.turns.iter().cloned().collect(),
            rolling_summary: self.rolling_summary.clone(),
        }
    }
}

/// 会话记忆管理器
///
/// 由服务进程持有并通过 `Arc` 共享。默认不淘汰任何会话；
/// 配置 `max_keys` 或 `idle_ttl_secs` 后分别按容量或空闲时间淘汰。
pub struct ConversationMemory {
    records: DashMap<String, MemoryRecord>,
    config: MemoryConfig,
}

impl ConversationMemory {
    /// 创建新的记忆管理器
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            records: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// 重新初始化会话记录：清空轮次和摘要，写入新策略。
    ///
    /// 已有记录会被覆盖，旧轮次不会迁移到新策略下。
    pub fn set_policy(
        &self,
        key: &str,
        policy: MemoryPolicy,
        window_size: Option<usize>,
    ) -> Result<()> {
        let window_size = window_size.unwrap_or(self.config.default_window_size);
        if window_size == 0 {
            return Err(AppError::InvalidPolicy(
                "window_size must be greater than 0".to_string(),
            ));
        }

        let created = self
            .records
            .insert(key.to_string(), MemoryRecord::new(policy, window_size))
            .is_none();
        if created {
            self.enforce_capacity(key);
        }

        info!(key = %key, policy = %policy, window_size, "Memory policy set");
        Ok(())
    }

    /// 追加轮次；会话不存在时按 Buffer 策略创建
    pub fn append_turn(&self, key: &str, role: Role, content: &str) {
        let buffer_max_turns = self.config.buffer_max_turns;
        let mut record = self.get_or_create(key, MemoryPolicy::Buffer);
        record.push(Turn::new(role, content), buffer_max_turns);

        debug!(
            key = %key,
            role = %role,
            policy = %record.policy,
            turns = record.turns.len(),
            "Turn appended"
        );
    }

    /// 读取会话快照；不存在的会话返回空快照
    pub fn read_memory(&self, key: &str) -> MemorySnapshot {
        self.records
            .get(key)
            .map(|record| record.snapshot())
            .unwrap_or_default()
    }

    /// 删除会话记录，返回记录是否存在
    pub fn clear(&self, key: &str) -> bool {
        let removed = self.records.remove(key).is_some();
        if removed {
            info!(key = %key, "Memory cleared");
        }
        removed
    }

    /// 会话当前策略，不存在时为 Buffer
    pub fn policy_of(&self, key: &str) -> MemoryPolicy {
        self.records
            .get(key)
            .map(|record| record.policy)
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// 当前会话数
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 删除空闲超过 `idle_ttl_secs` 的会话，返回删除数量
    pub fn purge_expired(&self) -> usize {
        let Some(ttl) = self.config.idle_ttl_secs.map(Duration::from_secs) else {
            return 0;
        };

        let before = self.records.len();
        self.records
            .retain(|_, record| record.last_touched.elapsed() < ttl);
        let purged = before.saturating_sub(self.records.len());

        if purged > 0 {
            info!(purged, "Expired memory records purged");
        }
        purged
    }

    /// 惰性创建的唯一入口
    fn get_or_create(
        &self,
        key: &str,
        default_policy: MemoryPolicy,
    ) -> RefMut<'_, String, MemoryRecord> {
        let window_size = self.config.default_window_size;
        loop {
            if let Some(record) = self.records.get_mut(key) {
                return record;
            }

            let mut created = false;
            drop(
                self.records
                    .entry(key.to_string())
                    .or_insert_with(|| {
                        created = true;
                        MemoryRecord::new(default_policy, window_size)
                    }),
            );
            // 淘汰期间不持有分片锁；若新记录被并发淘汰则下一轮重新创建
            if created {
                self.enforce_capacity(key);
            }
        }
    }

    /// 新会话插入后，超出 `max_keys` 的部分按最久未写入淘汰，`keep` 本身不会被淘汰。
    ///
    /// 每次创建返回前都会检查上限，因此并发创建不会让会话数持续超出上限；
    /// 多个创建同时淘汰时可能多淘汰几条。必须在不持有任何分片锁时调用。
    fn enforce_capacity(&self, keep: &str) {
        let Some(max_keys) = self.config.max_keys.filter(|max| *max > 0) else {
            return;
        };

        while self.records.len() > max_keys {
            let oldest = self
                .records
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.value().last_touched)
                .map(|entry| entry.key().clone());

            match oldest {
                Some(key) => {
                    self.records.remove(&key);
                    debug!(key = %key, "Evicted least recently written memory record");
                }
                None => break,
            }
        }
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> ConversationMemory {
        ConversationMemory::new(MemoryConfig {
            buffer_max_turns: 4,
            ..MemoryConfig::default()
        })
    }

    #[test]
    fn test_window_scenario() {
        let memory = memory();
        memory.set_policy("u1", MemoryPolicy::Window, Some(2)).unwrap();
        memory.append_turn("u1", Role::User, "a");
        memory.append_turn("u1", Role::Assistant, "b");
        memory.append_turn("u1", Role::User, "c");

        let snapshot = memory.read_memory("u1");
        assert_eq!(snapshot.turns, vec![Turn::assistant("b"), Turn::user("c")]);
        assert!(snapshot.rolling_summary.is_empty());
    }

    #[test]
    fn test_summary_scenario() {
        let memory = memory();
        memory.set_policy("u2", MemoryPolicy::Summary, Some(1)).unwrap();
        for content in ["x", "y", "z"] {
            memory.append_turn("u2", Role::User, content);
        }

        let snapshot = memory.read_memory("u2");
        assert_eq!(snapshot.turns, vec![Turn::user("z")]);
        assert_eq!(snapshot.rolling_summary, "x y");
    }

    #[test]
    fn test_buffer_uses_manager_cap_not_window() {
        let memory = memory();
        memory.set_policy("k", MemoryPolicy::Buffer, Some(1)).unwrap();
        for i in 0..6 {
            memory.append_turn("k", Role::User, &i.to_string());
        }

        let snapshot = memory.read_memory("k");
        assert_eq!(snapshot.turns.len(), 4);
        assert_eq!(snapshot.turns[0].content, "2");
    }

    #[test]
    fn test_lazy_creation_is_buffer() {
        let memory = memory();
        memory.append_turn("fresh", Role::User, "hi");

        let snapshot = memory.read_memory("fresh");
        assert_eq!(snapshot.policy, Some(MemoryPolicy::Buffer));
        assert_eq!(snapshot.window_size, Some(5));
        assert_eq!(snapshot.turns.len(), 1);
    }

    #[test]
    fn test_set_policy_resets_history() {
        let memory = memory();
        memory.set_policy("k", MemoryPolicy::Summary, Some(1)).unwrap();
        memory.append_turn("k", Role::User, "a");
        memory.append_turn("k", Role::User, "b");
        assert!(!memory.read_memory("k").rolling_summary.is_empty());

        memory.set_policy("k", MemoryPolicy::Window, Some(3)).unwrap();
        let snapshot = memory.read_memory("k");
        assert!(snapshot.turns.is_empty());
        assert!(snapshot.rolling_summary.is_empty());
        assert_eq!(snapshot.policy, Some(MemoryPolicy::Window));
    }

    #[test]
    fn test_zero_window_rejected() {
        let memory = memory();
        let result = memory.set_policy("k", MemoryPolicy::Window, Some(0));
        assert!(matches!(result, Err(AppError::InvalidPolicy(_))));
        assert!(!memory.contains("k"));
    }

    #[test]
    fn test_max_keys_evicts_least_recently_written() {
        let memory = ConversationMemory::new(MemoryConfig {
            max_keys: Some(2),
            ..MemoryConfig::default()
        });
        memory.append_turn("a", Role::User, "1");
        std::thread::sleep(Duration::from_millis(2));
        memory.append_turn("b", Role::User, "1");
        std::thread::sleep(Duration::from_millis(2));
        memory.append_turn("a", Role::User, "2");
        std::thread::sleep(Duration::from_millis(2));
        memory.append_turn("c", Role::User, "1");

        assert_eq!(memory.len(), 2);
        assert!(memory.contains("a"));
        assert!(!memory.contains("b"));
        assert!(memory.contains("c"));
    }

    #[test]
    fn test_purge_expired() {
        let memory = ConversationMemory::new(MemoryConfig {
            idle_ttl_secs: Some(0),
            ..MemoryConfig::default()
        });
        memory.append_turn("a", Role::User, "1");
        memory.append_turn("b", Role::User, "1");

        assert_eq!(memory.purge_expired(), 2);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_purge_disabled_without_ttl() {
        let memory = memory();
        memory.append_turn("a", Role::User, "1");
        assert_eq!(memory.purge_expired(), 0);
        assert_eq!(memory.len(), 1);
    }
}
