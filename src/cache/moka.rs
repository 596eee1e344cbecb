use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{CacheResult, RedirectCache};
use crate::config::CacheConfig;
use crate::storage::models::Link;

/// 自定义过期策略：条目存活时间不超过链接自身的剩余有效期
struct LinkExpiry {
    default_ttl: Duration,
}

impl Expiry<String, Link> for LinkExpiry {
    fn expire_after_create(&self, _key: &String, value: &Link, _created_at: Instant) -> Option<Duration> {
        match value.expires_at {
            Some(expires_at) => {
                let now = chrono::Utc::now();
                if expires_at <= now {
                    // 已过期，设置极短 TTL
                    Some(Duration::from_secs(1))
                } else {
                    let remaining = (expires_at - now).num_seconds() as u64;
                    Some(Duration::from_secs(
                        remaining.min(self.default_ttl.as_secs()),
                    ))
                }
            }
            None => Some(self.default_ttl), // 无过期时间，使用默认 TTL
        }
    }
}

pub struct MokaRedirectCache {
    inner: Cache<String, Link>,
}

impl MokaRedirectCache {
    pub fn new(config: &CacheConfig) -> Self {
        let default_ttl = Duration::from_secs(config.ttl_secs);

        let inner = Cache::builder()
            .max_capacity(config.capacity)
            .expire_after(LinkExpiry { default_ttl })
            .build();

        debug!(
            "MokaRedirectCache initialized with max capacity: {}, default TTL: {}s",
            config.capacity, config.ttl_secs
        );
        Self { inner }
    }
}

#[async_trait]
impl RedirectCache for MokaRedirectCache {
    async fn get(&self, token: &str) -> CacheResult {
        if let Some(link) = self.inner.get(token).await {
            CacheResult::Found(link)
        } else {
            CacheResult::Miss
        }
    }

    async fn insert(&self, token: String, link: Link) {
        // TTL 由 Expiry 从 link.expires_at 计算
        self.inner.insert(token, link).await;
    }

    async fn remove(&self, token: &str) {
        self.inner.invalidate(token).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
