use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use surrealdb::{
    Surreal,
    engine::any::{Any, connect},
    opt::auth::Root,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::metadata::PairMetadata;
use crate::models::profile::{ProfileCategory, ProfileContext};
use crate::storage::repository::{KnowledgeStore, item_value};

/// SurrealDB 连接池
#[derive(Clone)]
pub struct SurrealPool {
    /// 数据库连接
    db: Arc<Mutex<Option<Surreal<Any>>>>,
    /// 连接配置
    config: DatabaseConfig,
}

impl SurrealPool {
    /// 创建新的连接池
    pub async fn new(config: DatabaseConfig) -> std::result::Result<Self, surrealdb::Error> {
        let db: Surreal<Any> = connect(config.url.as_str()).await?;

        // 内嵌引擎（mem://）不需要认证
        if !config.username.is_empty() {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await?;
        }

        // 选择命名空间和数据库
        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        Ok(Self {
            db: Arc::new(Mutex::new(Some(db))),
            config,
        })
    }

    /// 获取内部数据库实例
    pub async fn inner(&self) -> Result<Surreal<Any>> {
        let guard = self.db.lock().await;
        guard
            .as_ref()
            .cloned()
            .ok_or_else(|| AppError::StoreUnavailable("database connection closed".to_string()))
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// 关闭连接
    pub async fn close(&self) {
        let mut guard = self.db.lock().await;
        *guard = None;
    }
}

/// 画像查询结果行
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileRow {
    interests: Vec<Option<String>>,
    skills: Vec<Option<String>>,
    personality_traits: Vec<Option<String>>,
    topics: Vec<Option<String>>,
}

impl ProfileRow {
    fn into_profile(self) -> ProfileContext {
        fn collect(values: Vec<Option<String>>) -> BTreeSet<String> {
            values.into_iter().flatten().collect()
        }

        ProfileContext {
            interests: collect(self.interests),
            skills: collect(self.skills),
            personality_traits: collect(self.personality_traits),
            topics: collect(self.topics),
        }
    }
}

/// 基于 SurrealDB 图关系的知识存储
///
/// 用户节点 `user:<name>`，条目节点 `<node_table>:<value>`，
/// 二者由 `RELATE user->edge_table->node` 边连接。
#[derive(Clone)]
pub struct SurrealKnowledgeStore {
    pool: SurrealPool,
}

impl SurrealKnowledgeStore {
    pub fn new(pool: SurrealPool) -> Self {
        Self { pool }
    }

    /// 为一类条目生成幂等的连接语句
    fn link_query(category: ProfileCategory) -> String {
        format!(
            "LET $u = type::thing('user', $user);
             UPSERT $u SET name = $user;
             FOR $value IN $values {{
                 LET $n = type::thing('{node}', $value);
                 UPSERT $n SET name = $value;
                 IF array::len((SELECT id FROM {edge} WHERE in = $u AND out = $n)) == 0 {{
                     RELATE $u->{edge}->$n;
                 }};
             }};",
            node = category.node_table(),
            edge = category.edge_table(),
        )
    }

    async fn link(&self, user: &str, category: ProfileCategory, values: Vec<String>) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }

        debug!(user = %user, category = %category, count = values.len(), "Linking graph nodes");

        self.pool
            .inner()
            .await?
            .query(Self::link_query(category))
            .bind(("user", user.to_string()))
            .bind(("values", values))
            .await?
            .check()?;
        Ok(())
    }
}

#[async_trait]
impl KnowledgeStore for SurrealKnowledgeStore {
    async fn ensure_user(&self, user: &str) -> Result<()> {
        self.pool
            .inner()
            .await?
            .query("UPSERT type::thing('user', $user) SET name = $user")
            .bind(("user", user.to_string()))
            .await?
            .check()?;
        Ok(())
    }

    async fn fetch_profile(&self, user: &str, topic_hint: Option<&str>) -> Result<ProfileContext> {
        let mut response = self
            .pool
            .inner()
            .await?
            .query(
                "SELECT
                    array::distinct(->has_interest->interest.name) AS interests,
                    array::distinct(->has_skill->skill.name) AS skills,
                    array::distinct(->has_personality_trait->personality.name) AS personality_traits,
                    array::distinct(->mentioned_topic->topic.name) AS topics
                 FROM type::thing('user', $user)",
            )
            .bind(("user", user.to_string()))
            .await?;

        let rows: Vec<ProfileRow> = response.take(0)?;
        let mut profile = rows
            .into_iter()
            .next()
            .map(ProfileRow::into_profile)
            .unwrap_or_default();

        if let Some(hint) = topic_hint {
            profile.restrict_topics(hint);
        }
        Ok(profile)
    }

    async fn upsert_tags(&self, user: &str, tags: &PairMetadata) -> Result<()> {
        self.ensure_user(user).await?;

        let profile = tags.to_profile();
        for category in ProfileCategory::ALL {
            let values = profile.values(category).iter().cloned().collect();
            self.link(user, category, values).await?;
        }
        Ok(())
    }

    async fn add_item(&self, user: &str, category: ProfileCategory, value: &str) -> Result<()> {
        let value = item_value(value)?;
        self.link(user, category, vec![value.to_string()]).await
    }

    async fn update_item(
        &self,
        user: &str,
        category: ProfileCategory,
        old_value: &str,
        new_value: &str,
    ) -> Result<bool> {
        let new_value = item_value(new_value)?;
        // 只改动该用户的边，同名节点可能被其他用户共享
        if !self.delete_item(user, category, old_value).await? {
            return Ok(false);
        }
        self.add_item(user, category, new_value).await?;
        Ok(true)
    }

    async fn delete_item(
        &self,
        user: &str,
        category: ProfileCategory,
        value: &str,
    ) -> Result<bool> {
        let query = format!(
            "LET $u = type::thing('user', $user);
             LET $n = type::thing('{node}', $value);
             LET $edges = (SELECT id FROM {edge} WHERE in = $u AND out = $n);
             DELETE {edge} WHERE in = $u AND out = $n;
             RETURN array::len($edges);",
            node = category.node_table(),
            edge = category.edge_table(),
        );

        let mut response = self
            .pool
            .inner()
            .await?
            .query(query)
            .bind(("user", user.to_string()))
            .bind(("value", value.trim().to_string()))
            .await?;

        let removed: Option<usize> = response.take(4)?;
        Ok(removed.unwrap_or(0) > 0)
    }

    async fn ping(&self) -> Result<()> {
        self.pool.inner().await?.health().await?;
        Ok(())
    }
}
