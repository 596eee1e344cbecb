//! Token 分配器
//!
//! 随机生成候选 token 并尝试插入；token 列上的唯一约束是冲突判定的
//! 权威来源，内存中的预检查在并发下说了不算。冲突就换一个候选重试。

use std::sync::Arc;

use tracing::debug;

use crate::errors::{LinkloomError, Result};
use crate::storage::LinkStore;
use crate::storage::models::{Link, NewLink};
use crate::utils::{TOKEN_LENGTH, generate_random_token, is_valid_token};

/// 放弃前的最大尝试次数
pub const MAX_ATTEMPTS: u32 = 20;

#[derive(Clone)]
pub struct TokenAllocator {
    store: Arc<LinkStore>,
    token_length: usize,
    max_attempts: u32,
}

impl TokenAllocator {
    pub fn new(store: Arc<LinkStore>) -> Self {
        Self::with_limits(store, TOKEN_LENGTH, MAX_ATTEMPTS)
    }

    /// 自定义 token 长度与尝试上限，便于在小 token 空间下验证耗尽路径
    pub fn with_limits(store: Arc<LinkStore>, token_length: usize, max_attempts: u32) -> Self {
        Self {
            store,
            token_length,
            max_attempts,
        }
    }

    /// 为新链接分配 token 并插入。`new_link.token` 会被每次尝试的
    /// 候选覆盖；全部尝试都撞上冲突时返回 AllocationExhausted。
    pub async fn allocate_and_insert(&self, mut new_link: NewLink) -> Result<Link> {
        for attempt in 1..=self.max_attempts {
            new_link.token = generate_random_token(self.token_length);

            match self.store.insert_link(&new_link).await {
                Ok(link) => {
                    if attempt > 1 {
                        debug!("Token allocated after {} attempts: {}", attempt, link.token);
                    }
                    return Ok(link);
                }
                Err(LinkloomError::TokenConflict(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(LinkloomError::allocation_exhausted(format!(
            "无法在 {} 次尝试内分配唯一 token",
            self.max_attempts
        )))
    }

    /// 用调用方指定的 token 插入。候选只做一次存在性预检，
    /// 冲突直接返回 TokenConflict，不换候选重试。
    pub async fn insert_with_candidate(
        &self,
        candidate: &str,
        mut new_link: NewLink,
    ) -> Result<Link> {
        let token = candidate.trim();
        if !is_valid_token(token) {
            return Err(LinkloomError::validation(format!(
                "自定义 token 不合法: {}",
                candidate
            )));
        }

        if self.store.find_by_token(token).await?.is_some() {
            return Err(LinkloomError::token_conflict(format!(
                "token 已被占用: {}",
                token
            )));
        }

        // 预检和插入之间仍可能被别人抢先，唯一约束兜底
        new_link.token = token.to_string();
        self.store.insert_link(&new_link).await
    }
}
