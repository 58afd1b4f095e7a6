use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::metadata::PairMetadata;
use crate::models::profile::{ProfileCategory, ProfileContext};

/// 知识图谱存储 trait
///
/// 以用户名为键，用户节点通过四类边连接兴趣、技能、性格特征、话题节点。
/// 后端不可达时返回 `AppError::StoreUnavailable`。
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// 确保用户节点存在
    async fn ensure_user(&self, user: &str) -> Result<()>;

    /// 读取用户画像
    ///
    /// `topic_hint` 存在时话题只保留名称包含该提示的条目，其他类别完整返回。
    async fn fetch_profile(&self, user: &str, topic_hint: Option<&str>) -> Result<ProfileContext>;

    /// 合并写入抽取出的标签（幂等）
    async fn upsert_tags(&self, user: &str, tags: &PairMetadata) -> Result<()>;

    /// 添加单个条目
    async fn add_item(&self, user: &str, category: ProfileCategory, value: &str) -> Result<()>;

    /// 把用户的某个条目替换为新值，返回旧条目是否存在
    async fn update_item(
        &self,
        user: &str,
        category: ProfileCategory,
        old_value: &str,
        new_value: &str,
    ) -> Result<bool>;

    /// 断开用户与条目的连接，返回条目是否存在
    async fn delete_item(&self, user: &str, category: ProfileCategory, value: &str)
    -> Result<bool>;

    /// 查看完整画像
    async fn view(&self, user: &str) -> Result<ProfileContext> {
        self.fetch_profile(user, None).await
    }

    /// 健康检查
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// 规范化单个条目值，去除首尾空白后不能为空
pub fn item_value(value: &str) -> Result<&str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation("value must not be empty".to_string()));
    }
    Ok(value)
}
