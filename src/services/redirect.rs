//! 重定向解析
//!
//! 读穿缓存 + 门控 + 异步遥测。对外只有两种结果：跳转目标，
//! 或者统一的"不存在/被拦截"——不泄露链接到底处于哪种状态。

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use super::gate::{self, GateDecision, GateReason};
use crate::cache::{CacheResult, RedirectCache};
use crate::errors::Result;
use crate::storage::LinkStore;
use crate::storage::models::Link;
use crate::telemetry::{ClickEvent, ClickRecorder};
use crate::utils::{is_valid_token, user_agent};

/// 请求侧随手可得的点击上下文
#[derive(Debug, Clone, Default)]
pub struct ClickContext {
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    Redirect(String),
    /// 不存在、停用、过期、超上限——对外不可区分
    NotFoundOrGated,
}

#[derive(Clone)]
pub struct RedirectService {
    store: Arc<LinkStore>,
    cache: Arc<dyn RedirectCache>,
    recorder: ClickRecorder,
}

impl RedirectService {
    pub fn new(
        store: Arc<LinkStore>,
        cache: Arc<dyn RedirectCache>,
        recorder: ClickRecorder,
    ) -> Self {
        Self {
            store,
            cache,
            recorder,
        }
    }

    pub async fn resolve(&self, token: &str, ctx: ClickContext) -> Result<ResolveOutcome> {
        // 格式不合法的 token 不值得一次存储往返
        if !is_valid_token(token) {
            return Ok(ResolveOutcome::NotFoundOrGated);
        }

        let now = Utc::now();

        // 命中缓存也要重新过门控：过期时间和 is_active 都可能在
        // 条目存活期内越过边界
        if let CacheResult::Found(link) = self.cache.get(token).await {
            return match gate::evaluate(&link, now) {
                GateDecision::Pass => {
                    self.record_click(&link, ctx);
                    Ok(ResolveOutcome::Redirect(link.destination))
                }
                GateDecision::Blocked(reason) => {
                    if reason == GateReason::Expired {
                        self.cache.remove(token).await;
                    }
                    debug!("Redirect blocked from cache: {} ({:?})", token, reason);
                    Ok(ResolveOutcome::NotFoundOrGated)
                }
            };
        }

        let Some(link) = self.store.find_by_token(token).await? else {
            return Ok(ResolveOutcome::NotFoundOrGated);
        };

        match gate::evaluate(&link, now) {
            GateDecision::Pass => {
                // 设了点击上限的链接不进缓存：计数每次命中都在动，
                // 上限判定必须以存储里的计数为准
                if !link.has_click_ceiling() {
                    self.cache.insert(token.to_string(), link.clone()).await;
                }
                self.record_click(&link, ctx);
                Ok(ResolveOutcome::Redirect(link.destination))
            }
            GateDecision::Blocked(reason) => {
                debug!("Redirect blocked: {} ({:?})", token, reason);
                Ok(ResolveOutcome::NotFoundOrGated)
            }
        }
    }

    /// 解析成功后把点击事件排队，绝不等待写入完成
    fn record_click(&self, link: &Link, ctx: ClickContext) {
        let profile = user_agent::classify(ctx.user_agent.as_deref());

        self.recorder.record(ClickEvent {
            link_id: link.id.clone(),
            occurred_at: Utc::now(),
            ip_address: ctx.ip_address,
            country: ctx.country,
            city: ctx.city,
            referrer: ctx.referrer,
            user_agent: ctx.user_agent,
            device_type: profile.device_type,
            browser: profile.browser,
            os: profile.os,
        });
    }
}
