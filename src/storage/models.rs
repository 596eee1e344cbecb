//! 领域模型
//!
//! 存储层内外统一使用这些类型，数据库行与它们的互转在 converters 中。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 订阅套餐，决定一个 owner 最多能持有多少条链接
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Basic,
    Pro,
}

impl Plan {
    pub fn link_limit(&self) -> u32 {
        match self {
            Plan::Free => 5,
            Plan::Basic => 20,
            Plan::Pro => 100,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Basic => "basic",
            Plan::Pro => "pro",
        }
    }

    pub fn parse(s: &str) -> Option<Plan> {
        match s {
            "free" => Some(Plan::Free),
            "basic" => Some(Plan::Basic),
            "pro" => Some(Plan::Pro),
            _ => None,
        }
    }
}

/// 租户（链接的所有者）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub plan: Plan,
    pub link_limit: u32,
    pub active_link_count: u32,
    pub created_at: DateTime<Utc>,
}

/// 短链接
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub owner_id: String,
    pub token: String,
    pub destination: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<u32>,
    pub click_count: u64,
    pub is_active: bool,
}

impl Link {
    /// max_clicks 为 0 等同于不设上限
    pub fn has_click_ceiling(&self) -> bool {
        self.max_clicks.is_some_and(|max| max > 0)
    }
}

/// 创建链接时的输入（id、token、created_at 由服务层生成）
#[derive(Debug, Clone)]
pub struct NewLink {
    pub id: String,
    pub owner_id: String,
    pub token: String,
    pub destination: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<u32>,
    pub is_active: bool,
}

/// 可选字段的三态补丁：保持、写入、清空
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldPatch<T> {
    #[default]
    Keep,
    Set(T),
    Clear,
}

impl<T> FieldPatch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldPatch::Keep)
    }

    /// 应用到当前值，得到更新后的值
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            FieldPatch::Keep => current,
            FieldPatch::Set(v) => Some(v),
            FieldPatch::Clear => None,
        }
    }
}

/// 局部更新：未出现的字段一律不动
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub destination: Option<String>,
    pub title: FieldPatch<String>,
    pub description: FieldPatch<String>,
    pub expires_at: FieldPatch<DateTime<Utc>>,
    pub max_clicks: FieldPatch<u32>,
    pub is_active: Option<bool>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.destination.is_none()
            && self.title.is_keep()
            && self.description.is_keep()
            && self.expires_at.is_keep()
            && self.max_clicks.is_keep()
            && self.is_active.is_none()
    }
}

/// 一次被记录的点击
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickRecord {
    pub id: i64,
    pub link_id: String,
    pub occurred_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_limits() {
        assert_eq!(Plan::Free.link_limit(), 5);
        assert_eq!(Plan::Basic.link_limit(), 20);
        assert_eq!(Plan::Pro.link_limit(), 100);
    }

    #[test]
    fn test_plan_round_trip() {
        for plan in [Plan::Free, Plan::Basic, Plan::Pro] {
            assert_eq!(Plan::parse(plan.as_str()), Some(plan));
        }
        assert_eq!(Plan::parse("enterprise"), None);
    }

    #[test]
    fn test_field_patch_apply() {
        assert_eq!(FieldPatch::<u32>::Keep.apply(Some(3)), Some(3));
        assert_eq!(FieldPatch::Set(7u32).apply(Some(3)), Some(7));
        assert_eq!(FieldPatch::<u32>::Clear.apply(Some(3)), None);
    }

    #[test]
    fn test_empty_patch() {
        assert!(LinkPatch::default().is_empty());
        let patch = LinkPatch {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
