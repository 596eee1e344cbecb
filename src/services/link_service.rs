//! 链接生命周期服务
//!
//! 所有 owner 侧的写路径都从这里走：校验、配额、分配、落库、缓存失效。
//! 缓存失效与写同步完成，单实例内写后读不会看到旧值。

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use super::{QuotaGuard, TokenAllocator};
use crate::cache::RedirectCache;
use crate::errors::{LinkloomError, Result};
use crate::storage::LinkStore;
use crate::storage::models::{Link, LinkPatch, NewLink};
use crate::utils::url_validator::validate_destination;

/// 创建链接的输入
#[derive(Debug, Clone, Default)]
pub struct CreateLink {
    pub destination: String,
    pub custom_token: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<u32>,
}

#[derive(Clone)]
pub struct LinkService {
    store: Arc<LinkStore>,
    cache: Arc<dyn RedirectCache>,
    allocator: TokenAllocator,
    quota: QuotaGuard,
}

impl LinkService {
    pub fn new(store: Arc<LinkStore>, cache: Arc<dyn RedirectCache>) -> Self {
        Self {
            allocator: TokenAllocator::new(store.clone()),
            quota: QuotaGuard::new(store.clone()),
            store,
            cache,
        }
    }

    pub fn quota(&self) -> &QuotaGuard {
        &self.quota
    }

    pub async fn create_link(&self, owner_id: &str, input: CreateLink) -> Result<Link> {
        validate_destination(&input.destination)
            .map_err(|e| LinkloomError::invalid_destination(e.to_string()))?;

        self.quota.check_admit(owner_id).await?;

        let new_link = NewLink {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            token: String::new(), // 由分配器填充
            destination: input.destination,
            title: input.title,
            description: input.description,
            created_at: Utc::now(),
            expires_at: input.expires_at,
            max_clicks: input.max_clicks,
            is_active: true,
        };

        let link = match input.custom_token {
            Some(candidate) => {
                self.allocator
                    .insert_with_candidate(&candidate, new_link)
                    .await?
            }
            None => self.allocator.allocate_and_insert(new_link).await?,
        };
        self.quota.admit(owner_id).await?;

        // 新链接大概率马上被访问，预热缓存；设了点击上限的除外
        if !link.has_click_ceiling() {
            self.cache.insert(link.token.clone(), link.clone()).await;
        }

        info!("LinkService: created link {} for owner {}", link.token, owner_id);
        Ok(link)
    }

    /// 取单条链接，越权访问一律 Forbidden
    pub async fn get_link(&self, owner_id: &str, id: &str) -> Result<Link> {
        let link = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| LinkloomError::not_found(format!("链接不存在: {}", id)))?;

        if link.owner_id != owner_id {
            return Err(LinkloomError::forbidden("链接属于其他 owner".to_string()));
        }

        Ok(link)
    }

    pub async fn list_links(&self, owner_id: &str) -> Result<Vec<Link>> {
        self.store.list_by_owner(owner_id).await
    }

    pub async fn update_link(
        &self,
        owner_id: &str,
        id: &str,
        patch: LinkPatch,
    ) -> Result<Link> {
        if patch.is_empty() {
            return Err(LinkloomError::validation("没有需要更新的字段".to_string()));
        }

        if let Some(destination) = &patch.destination {
            validate_destination(destination)
                .map_err(|e| LinkloomError::invalid_destination(e.to_string()))?;
        }

        // 先做所有权检查，再动数据
        let existing = self.get_link(owner_id, id).await?;
        let activity_changed = patch.is_active.is_some_and(|v| v != existing.is_active);

        // 重新启用也占名额，和创建走同一个准入检查
        if activity_changed && patch.is_active == Some(true) {
            self.quota.check_admit(owner_id).await?;
        }

        let updated = self.store.update_link(id, &patch).await?;

        // 同步失效缓存，下一次解析从存储读到新值
        self.cache.remove(&updated.token).await;

        if activity_changed {
            self.quota.release(owner_id).await?;
        }

        info!("LinkService: updated link {} for owner {}", updated.token, owner_id);
        Ok(updated)
    }

    pub async fn delete_link(&self, owner_id: &str, id: &str) -> Result<()> {
        let existing = self.get_link(owner_id, id).await?;

        self.store.delete_link(id).await?;
        self.cache.remove(&existing.token).await;
        self.quota.release(owner_id).await?;

        info!("LinkService: deleted link {} for owner {}", existing.token, owner_id);
        Ok(())
    }

    /// 批量删除：整批校验所有权，任一 id 陌生或越权则整批拒绝
    pub async fn bulk_delete(&self, owner_id: &str, ids: &[String]) -> Result<u64> {
        let owned = self.claim_batch(owner_id, ids).await?;
        if owned.is_empty() {
            return Ok(0);
        }

        let owned_ids: Vec<String> = owned.iter().map(|l| l.id.clone()).collect();
        let deleted = self.store.bulk_delete(owner_id, &owned_ids).await?;

        for link in &owned {
            self.cache.remove(&link.token).await;
        }
        self.quota.release(owner_id).await?;

        info!("LinkService: bulk deleted {} links for owner {}", deleted, owner_id);
        Ok(deleted)
    }

    /// 批量启停，返回受影响数量；所有权校验同批量删除
    pub async fn bulk_set_active(
        &self,
        owner_id: &str,
        ids: &[String],
        is_active: bool,
    ) -> Result<u64> {
        let owned = self.claim_batch(owner_id, ids).await?;
        if owned.is_empty() {
            return Ok(0);
        }

        // 批量重新启用也要过配额：现占用加新启用数不能超上限
        if is_active {
            let reactivating = owned.iter().filter(|l| !l.is_active).count() as u32;
            if reactivating > 0 {
                self.quota.check_capacity(owner_id, reactivating).await?;
            }
        }

        let owned_ids: Vec<String> = owned.iter().map(|l| l.id.clone()).collect();
        let affected = self
            .store
            .bulk_set_active(owner_id, &owned_ids, is_active)
            .await?;

        for link in &owned {
            self.cache.remove(&link.token).await;
        }
        self.quota.release(owner_id).await?;

        Ok(affected)
    }

    /// 批量操作的前置校验：请求里出现任何不存在或属于他人的 id，
    /// 整批拒绝，一行都不动
    async fn claim_batch(&self, owner_id: &str, ids: &[String]) -> Result<Vec<Link>> {
        let requested: HashSet<&str> = ids.iter().map(String::as_str).collect();
        if requested.is_empty() {
            return Ok(Vec::new());
        }

        let owned = self.store.batch_get_owned(owner_id, ids).await?;
        if owned.len() != requested.len() {
            return Err(LinkloomError::forbidden(
                "批量操作包含不存在或属于其他 owner 的链接".to_string(),
            ));
        }

        Ok(owned)
    }
}
