//! 配额守卫
//!
//! 占用走计数器自增，释放走全量重算：并发删除下做减法会漂移，
//! 重算以存储为准。

use std::sync::Arc;

use tracing::info;

use crate::errors::{LinkloomError, Result};
use crate::storage::LinkStore;
use crate::storage::models::{Owner, Plan};

#[derive(Clone)]
pub struct QuotaGuard {
    store: Arc<LinkStore>,
}

impl QuotaGuard {
    pub fn new(store: Arc<LinkStore>) -> Self {
        Self { store }
    }

    pub fn can_admit(owner: &Owner) -> bool {
        owner.active_link_count < owner.link_limit
    }

    /// 创建前的准入检查，配额已满时报 QuotaExceeded
    pub async fn check_admit(&self, owner_id: &str) -> Result<Owner> {
        let owner = self
            .store
            .get_owner(owner_id)
            .await?
            .ok_or_else(|| LinkloomError::not_found(format!("owner 不存在: {}", owner_id)))?;

        if !Self::can_admit(&owner) {
            return Err(LinkloomError::quota_exceeded(
                owner.active_link_count,
                owner.link_limit,
            ));
        }

        Ok(owner)
    }

    /// 批量重新启用前的准入检查：现有占用加新增数量不能超过上限
    pub async fn check_capacity(&self, owner_id: &str, additional: u32) -> Result<Owner> {
        let owner = self
            .store
            .get_owner(owner_id)
            .await?
            .ok_or_else(|| LinkloomError::not_found(format!("owner 不存在: {}", owner_id)))?;

        if owner.active_link_count + additional > owner.link_limit {
            return Err(LinkloomError::quota_exceeded(
                owner.active_link_count,
                owner.link_limit,
            ));
        }

        Ok(owner)
    }

    /// 创建成功后占用一个名额
    pub async fn admit(&self, owner_id: &str) -> Result<()> {
        self.store.increment_active_count(owner_id).await
    }

    /// 删除或停用后从存储重算占用
    pub async fn release(&self, owner_id: &str) -> Result<u64> {
        self.store.recompute_active_count(owner_id).await
    }

    /// 换套餐：当前占用超过新上限时拒绝，调用方需先削减链接
    pub async fn set_plan(&self, owner_id: &str, plan: Plan) -> Result<Owner> {
        let used = self.store.count_active_links(owner_id).await? as u32;
        let new_limit = plan.link_limit();

        if used > new_limit {
            return Err(LinkloomError::quota_exceeded(used, new_limit));
        }

        let owner = self.store.set_owner_plan(owner_id, plan).await?;
        info!(
            "Plan changed for owner {}: {} (limit {})",
            owner_id,
            plan.as_str(),
            new_limit
        );
        Ok(owner)
    }
}
