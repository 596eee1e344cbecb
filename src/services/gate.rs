//! 访问门控
//!
//! 纯函数：Gated 是派生状态，每次访问现算，不落库。
//! 时间由调用方注入，便于测试边界。

use chrono::{DateTime, Utc};

use crate::storage::models::Link;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateReason {
    Inactive,
    Expired,
    ClickCeilingReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Pass,
    Blocked(GateReason),
}

impl GateDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, GateDecision::Pass)
    }
}

/// 判定链接当前是否可跳转。
/// 过期判定：`expires_at <= now` 即拦截，精确到时间戳本身。
/// 次数上限：已计 `click_count >= max_clicks` 即拦截，第 max 次之后不再放行；
/// 上限为 0 等同于不限。
pub fn evaluate(link: &Link, now: DateTime<Utc>) -> GateDecision {
    if !link.is_active {
        return GateDecision::Blocked(GateReason::Inactive);
    }

    if let Some(expires_at) = link.expires_at {
        if expires_at <= now {
            return GateDecision::Blocked(GateReason::Expired);
        }
    }

    if let Some(max_clicks) = link.max_clicks {
        if max_clicks > 0 && link.click_count >= max_clicks as u64 {
            return GateDecision::Blocked(GateReason::ClickCeilingReached);
        }
    }

    GateDecision::Pass
}
