//! 进程内知识图谱
//!
//! 用于 `memory` 后端和测试，重启后数据丢失。

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::Result;
use crate::models::metadata::PairMetadata;
use crate::models::profile::{ProfileCategory, ProfileContext};
use crate::storage::repository::{KnowledgeStore, item_value};

/// 进程内知识图谱存储
#[derive(Default)]
pub struct InMemoryKnowledgeStore {
    users: RwLock<HashMap<String, ProfileContext>>,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用户数量
    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn ensure_user(&self, user: &str) -> Result<()> {
        self.users.write().entry(user.to_string()).or_default();
        Ok(())
    }

    async fn fetch_profile(&self, user: &str, topic_hint: Option<&str>) -> Result<ProfileContext> {
        let mut profile = self.users.read().get(user).cloned().unwrap_or_default();
        if let Some(hint) = topic_hint {
            profile.restrict_topics(hint);
        }
        Ok(profile)
    }

    async fn upsert_tags(&self, user: &str, tags: &PairMetadata) -> Result<()> {
        let incoming = tags.to_profile();
        let mut users = self.users.write();
        let profile = users.entry(user.to_string()).or_default();
        for category in ProfileCategory::ALL {
            for value in incoming.values(category) {
                profile.insert(category, value);
            }
        }
        Ok(())
    }

    async fn add_item(&self, user: &str, category: ProfileCategory, value: &str) -> Result<()> {
        let value = item_value(value)?;
        self.users
            .write()
            .entry(user.to_string())
            .or_default()
            .insert(category, value);
        Ok(())
    }

    async fn update_item(
        &self,
        user: &str,
        category: ProfileCategory,
        old_value: &str,
        new_value: &str,
    ) -> Result<bool> {
        let new_value = item_value(new_value)?;
        let mut users = self.users.write();
        let Some(profile) = users.get_mut(user) else {
            return Ok(false);
        };
        if !profile.values_mut(category).remove(old_value.trim()) {
            return Ok(false);
        }
        profile.insert(category, new_value);
        Ok(true)
    }

    async fn delete_item(
        &self,
        user: &str,
        category: ProfileCategory,
        value: &str,
    ) -> Result<bool> {
        Ok(self
            .users
            .write()
            .get_mut(user)
            .map(|profile| profile.values_mut(category).remove(value.trim()))
            .unwrap_or(false))
    }
}
