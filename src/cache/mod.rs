//! 重定向热路径缓存

mod moka;

use async_trait::async_trait;

use crate::storage::models::Link;

pub use moka::MokaRedirectCache;

/// 缓存查询结果
#[derive(Debug, Clone)]
pub enum CacheResult {
    /// 未命中
    Miss,
    /// 成功获取到缓存值
    Found(Link),
}

#[async_trait]
pub trait RedirectCache: Send + Sync {
    async fn get(&self, token: &str) -> CacheResult;
    async fn insert(&self, token: String, link: Link);
    async fn remove(&self, token: &str);
    async fn invalidate_all(&self);
}
