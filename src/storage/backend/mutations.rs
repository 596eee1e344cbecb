//! Mutation operations for LinkStore
//!
//! This module contains all write database operations.

use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, ExprTrait, QueryFilter,
    sea_query::Expr,
};
use tracing::info;

use super::converters::{model_to_link, model_to_owner, new_link_to_active_model};
use super::{LinkStore, retry};
use crate::errors::{LinkloomError, Result};
use crate::storage::models::{FieldPatch, Link, LinkPatch, NewLink, Owner, Plan};

use migration::entities::{link, owner};

fn optional_patch<T, U>(patch: &FieldPatch<T>, map: impl Fn(&T) -> U) -> ActiveValue<Option<U>>
where
    U: Into<sea_orm::Value> + sea_orm::sea_query::Nullable,
{
    match patch {
        FieldPatch::Keep => NotSet,
        FieldPatch::Set(v) => Set(Some(map(v))),
        FieldPatch::Clear => Set(None),
    }
}

impl LinkStore {
    /// 插入新链接。token 的唯一约束是冲突检测的权威来源：
    /// 唯一约束冲突映射为 TokenConflict，由调用方决定是否换 token 重试。
    pub async fn insert_link(&self, new_link: &NewLink) -> Result<Link> {
        let db = self.get_db();

        let result = retry::with_retry(
            &format!("insert_link({})", new_link.token),
            self.retry_config(),
            || async {
                link::Entity::insert(new_link_to_active_model(new_link))
                    .exec(db)
                    .await
            },
        )
        .await;

        if let Err(e) = result {
            if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) {
                return Err(LinkloomError::token_conflict(format!(
                    "token 已被占用: {}",
                    new_link.token
                )));
            }
            return Err(LinkloomError::database_operation(format!(
                "插入链接失败: {}",
                e
            )));
        }

        info!("Link created: {} -> {}", new_link.token, new_link.destination);
        Ok(Link {
            id: new_link.id.clone(),
            owner_id: new_link.owner_id.clone(),
            token: new_link.token.clone(),
            destination: new_link.destination.clone(),
            title: new_link.title.clone(),
            description: new_link.description.clone(),
            created_at: new_link.created_at,
            expires_at: new_link.expires_at,
            max_clicks: new_link.max_clicks,
            click_count: 0,
            is_active: new_link.is_active,
        })
    }

    /// 局部更新：只写补丁中出现的列，token 与计数器不可通过此路径修改
    pub async fn update_link(&self, id: &str, patch: &LinkPatch) -> Result<Link> {
        let mut active = link::ActiveModel {
            id: Set(id.to_string()),
            ..Default::default()
        };

        if let Some(destination) = &patch.destination {
            active.destination = Set(destination.clone());
        }
        active.title = optional_patch(&patch.title, |v| v.clone());
        active.description = optional_patch(&patch.description, |v| v.clone());
        active.expires_at = optional_patch(&patch.expires_at, |v| *v);
        active.max_clicks = optional_patch(&patch.max_clicks, |v| *v as i32);
        if let Some(is_active) = patch.is_active {
            active.is_active = Set(is_active);
        }

        let model = active.update(self.get_db()).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => {
                LinkloomError::not_found(format!("链接不存在: {}", id))
            }
            other => LinkloomError::database_operation(format!("更新链接失败: {}", other)),
        })?;

        Ok(model_to_link(model))
    }

    pub async fn delete_link(&self, id: &str) -> Result<()> {
        let db = self.get_db();
        let id_owned = id.to_string();

        let result = retry::with_retry(
            &format!("delete_link({})", id),
            self.retry_config(),
            || async { link::Entity::delete_by_id(&id_owned).exec(db).await },
        )
        .await
        .map_err(|e| LinkloomError::database_operation(format!("删除链接失败: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(LinkloomError::not_found(format!("链接不存在: {}", id)));
        }

        info!("Link deleted: {}", id);
        Ok(())
    }

    /// 批量删除（只删属于该 owner 的行），返回删除数量
    pub async fn bulk_delete(&self, owner_id: &str, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = link::Entity::delete_many()
            .filter(link::Column::OwnerId.eq(owner_id))
            .filter(link::Column::Id.is_in(ids.iter().cloned()))
            .exec(self.get_db())
            .await
            .map_err(|e| LinkloomError::database_operation(format!("批量删除失败: {}", e)))?;

        info!("Bulk deleted {} links for owner {}", result.rows_affected, owner_id);
        Ok(result.rows_affected)
    }

    /// 批量启停（只改属于该 owner 的行），返回受影响数量
    pub async fn bulk_set_active(
        &self,
        owner_id: &str,
        ids: &[String],
        is_active: bool,
    ) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = link::Entity::update_many()
            .col_expr(link::Column::IsActive, Expr::value(is_active))
            .filter(link::Column::OwnerId.eq(owner_id))
            .filter(link::Column::Id.is_in(ids.iter().cloned()))
            .exec(self.get_db())
            .await
            .map_err(|e| LinkloomError::database_operation(format!("批量更新失败: {}", e)))?;

        Ok(result.rows_affected)
    }

    /// 首次见到的 subject 自动建 owner 行（free 套餐）
    pub async fn ensure_owner(&self, subject_id: &str) -> Result<Owner> {
        if let Some(existing) = self.get_owner(subject_id).await? {
            return Ok(existing);
        }

        let plan = Plan::Free;
        let active = owner::ActiveModel {
            id: Set(subject_id.to_string()),
            plan: Set(plan.as_str().to_string()),
            link_limit: Set(plan.link_limit() as i32),
            active_link_count: Set(0),
            created_at: Set(Utc::now()),
        };

        match owner::Entity::insert(active).exec(self.get_db()).await {
            Ok(_) => {
                info!("Owner created: {} (plan={})", subject_id, plan.as_str());
            }
            // 并发首访：另一请求已建行，重新读取即可
            Err(e) if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) => {}
            Err(e) => {
                return Err(LinkloomError::database_operation(format!(
                    "创建 owner 失败: {}",
                    e
                )));
            }
        }

        self.get_owner(subject_id)
            .await?
            .ok_or_else(|| LinkloomError::database_operation("owner 创建后读取失败".to_string()))
    }

    /// 更新套餐，同时把 link_limit 同步为新套餐的上限
    pub async fn set_owner_plan(&self, owner_id: &str, plan: Plan) -> Result<Owner> {
        let active = owner::ActiveModel {
            id: Set(owner_id.to_string()),
            plan: Set(plan.as_str().to_string()),
            link_limit: Set(plan.link_limit() as i32),
            ..Default::default()
        };

        let model = active.update(self.get_db()).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => {
                LinkloomError::not_found(format!("owner 不存在: {}", owner_id))
            }
            other => LinkloomError::database_operation(format!("更新套餐失败: {}", other)),
        })?;

        Ok(model_to_owner(model))
    }

    /// 配额占用：active_link_count + 1
    pub async fn increment_active_count(&self, owner_id: &str) -> Result<()> {
        owner::Entity::update_many()
            .col_expr(
                owner::Column::ActiveLinkCount,
                Expr::col(owner::Column::ActiveLinkCount).add(1),
            )
            .filter(owner::Column::Id.eq(owner_id))
            .exec(self.get_db())
            .await
            .map_err(|e| LinkloomError::database_operation(format!("更新配额计数失败: {}", e)))?;

        Ok(())
    }

    /// 配额释放：从存储重新统计，而不是做减法（并发删除下减法会漂移）
    pub async fn recompute_active_count(&self, owner_id: &str) -> Result<u64> {
        let count = self.count_active_links(owner_id).await?;

        owner::Entity::update_many()
            .col_expr(owner::Column::ActiveLinkCount, Expr::value(count as i32))
            .filter(owner::Column::Id.eq(owner_id))
            .exec(self.get_db())
            .await
            .map_err(|e| LinkloomError::database_operation(format!("回写配额计数失败: {}", e)))?;

        Ok(count)
    }
}
