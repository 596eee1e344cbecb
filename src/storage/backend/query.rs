//! Query operations for LinkStore
//!
//! This module contains all read-only database operations.

use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::debug;

use super::converters::{click_to_record, model_to_link, model_to_owner};
use super::{LinkStore, retry};
use crate::errors::{LinkloomError, Result};
use crate::storage::models::{ClickRecord, Link, Owner};

use migration::entities::{click, link, owner};

impl LinkStore {
    /// 按 token 查找链接（重定向热路径）
    pub async fn find_by_token(&self, token: &str) -> Result<Option<Link>> {
        let db = self.get_db();
        let token_owned = token.to_string();

        let model = retry::with_retry(
            &format!("find_by_token({})", token),
            self.retry_config(),
            || async {
                link::Entity::find()
                    .filter(link::Column::Token.eq(&token_owned))
                    .one(db)
                    .await
            },
        )
        .await
        .map_err(|e| LinkloomError::database_operation(format!("按 token 查询失败: {}", e)))?;

        Ok(model.map(model_to_link))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Link>> {
        let db = self.get_db();
        let id_owned = id.to_string();

        let model = retry::with_retry(
            &format!("find_by_id({})", id),
            self.retry_config(),
            || async { link::Entity::find_by_id(&id_owned).one(db).await },
        )
        .await
        .map_err(|e| LinkloomError::database_operation(format!("按 id 查询失败: {}", e)))?;

        Ok(model.map(model_to_link))
    }

    /// 某个 owner 的全部链接，按创建时间倒序
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Link>> {
        let models = link::Entity::find()
            .filter(link::Column::OwnerId.eq(owner_id))
            .order_by_desc(link::Column::CreatedAt)
            .all(self.get_db())
            .await
            .map_err(|e| LinkloomError::database_operation(format!("列出链接失败: {}", e)))?;

        debug!("Listed {} links for owner {}", models.len(), owner_id);
        Ok(models.into_iter().map(model_to_link).collect())
    }

    /// 批量取回属于某 owner 的链接（越权的 id 直接被过滤掉）
    pub async fn batch_get_owned(&self, owner_id: &str, ids: &[String]) -> Result<Vec<Link>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = link::Entity::find()
            .filter(link::Column::OwnerId.eq(owner_id))
            .filter(link::Column::Id.is_in(ids.iter().cloned()))
            .all(self.get_db())
            .await
            .map_err(|e| LinkloomError::database_operation(format!("批量查询失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_link).collect())
    }

    /// 最近 `limit` 条点击，按发生时间倒序
    pub async fn recent_clicks(&self, link_id: &str, limit: u64) -> Result<Vec<ClickRecord>> {
        let models = click::Entity::find()
            .filter(click::Column::LinkId.eq(link_id))
            .order_by_desc(click::Column::OccurredAt)
            .limit(limit)
            .all(self.get_db())
            .await
            .map_err(|e| LinkloomError::database_operation(format!("查询点击记录失败: {}", e)))?;

        Ok(models.into_iter().map(click_to_record).collect())
    }

    pub async fn get_owner(&self, owner_id: &str) -> Result<Option<Owner>> {
        let model = owner::Entity::find_by_id(owner_id)
            .one(self.get_db())
            .await
            .map_err(|e| LinkloomError::database_operation(format!("查询 owner 失败: {}", e)))?;

        Ok(model.map(model_to_owner))
    }

    /// 统计某 owner 当前处于激活状态的链接数（配额的权威口径）
    pub async fn count_active_links(&self, owner_id: &str) -> Result<u64> {
        let count = link::Entity::find()
            .filter(link::Column::OwnerId.eq(owner_id))
            .filter(link::Column::IsActive.eq(true))
            .count(self.get_db())
            .await
            .map_err(|e| LinkloomError::database_operation(format!("统计链接数失败: {}", e)))?;

        Ok(count)
    }
}
