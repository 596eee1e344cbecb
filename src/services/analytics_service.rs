//! 点击分析聚合
//!
//! 读时聚合最近一段点击样本，不维护物化的汇总表。
//! 总点击数以 links.click_count 为准，不从样本推算。

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use chrono::{DateTime, Utc};

use crate::errors::{LinkloomError, Result};
use crate::storage::LinkStore;
use crate::storage::models::{ClickRecord, Link};

/// 参与聚合的最近点击样本量
const AGGREGATE_SAMPLE: u64 = 1000;
/// 明细里返回的最近点击条数
const RECENT_DETAIL: usize = 50;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BucketCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DayCount {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsView {
    pub token: String,
    pub destination: String,
    pub created_at: DateTime<Utc>,
    pub total_clicks: u64,
    pub countries: Vec<BucketCount>,
    pub referrers: Vec<BucketCount>,
    pub devices: Vec<BucketCount>,
    pub browsers: Vec<BucketCount>,
    pub os_types: Vec<BucketCount>,
    /// 按 UTC 日期（YYYY-MM-DD）的时间序列，按日期升序
    pub clicks_by_day: Vec<DayCount>,
    pub recent_clicks: Vec<ClickRecord>,
}

#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<LinkStore>,
}

impl AnalyticsService {
    pub fn new(store: Arc<LinkStore>) -> Self {
        Self { store }
    }

    pub async fn link_analytics(&self, owner_id: &str, token: &str) -> Result<AnalyticsView> {
        let link = self
            .store
            .find_by_token(token)
            .await?
            .ok_or_else(|| LinkloomError::not_found(format!("链接不存在: {}", token)))?;

        if link.owner_id != owner_id {
            return Err(LinkloomError::forbidden("链接属于其他 owner".to_string()));
        }

        let clicks = self.store.recent_clicks(&link.id, AGGREGATE_SAMPLE).await?;
        Ok(aggregate(&link, &clicks))
    }
}

/// 把点击样本折叠成聚合视图。`clicks` 按发生时间倒序传入。
pub fn aggregate(link: &Link, clicks: &[ClickRecord]) -> AnalyticsView {
    let mut countries: HashMap<String, u64> = HashMap::new();
    let mut referrers: HashMap<String, u64> = HashMap::new();
    let mut devices: HashMap<String, u64> = HashMap::new();
    let mut browsers: HashMap<String, u64> = HashMap::new();
    let mut os_types: HashMap<String, u64> = HashMap::new();
    let mut by_day: HashMap<String, u64> = HashMap::new();

    for click in clicks {
        bump(&mut countries, click.country.as_deref().unwrap_or("Unknown"));
        // 无来源的点击归为 Direct
        bump(&mut referrers, click.referrer.as_deref().unwrap_or("Direct"));
        bump(&mut devices, click.device_type.as_deref().unwrap_or("Unknown"));
        bump(&mut browsers, click.browser.as_deref().unwrap_or("Unknown"));
        bump(&mut os_types, click.os.as_deref().unwrap_or("Unknown"));
        bump(&mut by_day, &click.occurred_at.format("%Y-%m-%d").to_string());
    }

    let mut clicks_by_day: Vec<DayCount> = by_day
        .into_iter()
        .map(|(date, count)| DayCount { date, count })
        .collect();
    // YYYY-MM-DD 的字典序就是时间序
    clicks_by_day.sort_by(|a, b| a.date.cmp(&b.date));

    AnalyticsView {
        token: link.token.clone(),
        destination: link.destination.clone(),
        created_at: link.created_at,
        total_clicks: link.click_count,
        countries: into_sorted_buckets(countries),
        referrers: into_sorted_buckets(referrers),
        devices: into_sorted_buckets(devices),
        browsers: into_sorted_buckets(browsers),
        os_types: into_sorted_buckets(os_types),
        clicks_by_day,
        recent_clicks: clicks.iter().take(RECENT_DETAIL).cloned().collect(),
    }
}

fn bump(map: &mut HashMap<String, u64>, key: &str) {
    *map.entry(key.to_string()).or_insert(0) += 1;
}

/// 计数降序，同数按名称排，保证输出稳定
fn into_sorted_buckets(map: HashMap<String, u64>) -> Vec<BucketCount> {
    let mut buckets: Vec<BucketCount> = map
        .into_iter()
        .map(|(name, count)| BucketCount { name, count })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn link_with_count(click_count: u64) -> Link {
        Link {
            id: "l-1".to_string(),
            owner_id: "o-1".to_string(),
            token: "aB3xY9z".to_string(),
            destination: "https://example.com".to_string(),
            title: None,
            description: None,
            created_at: Utc::now(),
            expires_at: None,
            max_clicks: None,
            click_count,
            is_active: true,
        }
    }

    fn click(
        occurred_at: chrono::DateTime<Utc>,
        country: Option<&str>,
        referrer: Option<&str>,
        device: &str,
        browser: &str,
        os: &str,
    ) -> ClickRecord {
        ClickRecord {
            id: 0,
            link_id: "l-1".to_string(),
            occurred_at,
            ip_address: None,
            country: country.map(str::to_string),
            city: None,
            referrer: referrer.map(str::to_string),
            user_agent: None,
            device_type: Some(device.to_string()),
            browser: Some(browser.to_string()),
            os: Some(os.to_string()),
        }
    }

    #[test]
    fn test_zero_clicks_yields_empty_view() {
        let view = aggregate(&link_with_count(0), &[]);
        assert_eq!(view.total_clicks, 0);
        assert!(view.countries.is_empty());
        assert!(view.clicks_by_day.is_empty());
        assert!(view.recent_clicks.is_empty());
    }

    #[test]
    fn test_total_comes_from_counter_not_sample() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let clicks = vec![click(t, None, None, "desktop", "Chrome", "Windows")];
        // 样本只有 1 条，但计数器说 42
        let view = aggregate(&link_with_count(42), &clicks);
        assert_eq!(view.total_clicks, 42);
    }

    #[test]
    fn test_missing_referrer_counts_as_direct() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let clicks = vec![
            click(t, None, None, "desktop", "Chrome", "Windows"),
            click(t, None, Some("https://news.example"), "desktop", "Chrome", "Windows"),
            click(t, None, None, "mobile", "Safari", "iOS"),
        ];
        let view = aggregate(&link_with_count(3), &clicks);
        assert_eq!(
            view.referrers[0],
            BucketCount {
                name: "Direct".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn test_buckets_sorted_by_count_desc() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let clicks = vec![
            click(t, Some("DE"), None, "desktop", "Chrome", "Windows"),
            click(t, Some("US"), None, "desktop", "Chrome", "Windows"),
            click(t, Some("US"), None, "desktop", "Firefox", "Linux"),
        ];
        let view = aggregate(&link_with_count(3), &clicks);
        assert_eq!(view.countries[0].name, "US");
        assert_eq!(view.countries[0].count, 2);
        assert_eq!(view.countries[1].name, "DE");
    }

    #[test]
    fn test_clicks_by_day_chronological() {
        let day1 = Utc.with_ymd_and_hms(2026, 3, 1, 23, 59, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2026, 3, 2, 0, 1, 0).unwrap();
        // 倒序传入（最近的在前）
        let clicks = vec![
            click(day2, None, None, "desktop", "Chrome", "Windows"),
            click(day1, None, None, "desktop", "Chrome", "Windows"),
            click(day1, None, None, "desktop", "Chrome", "Windows"),
        ];
        let view = aggregate(&link_with_count(3), &clicks);
        assert_eq!(
            view.clicks_by_day,
            vec![
                DayCount {
                    date: "2026-03-01".to_string(),
                    count: 2
                },
                DayCount {
                    date: "2026-03-02".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_recent_detail_is_capped_at_50() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let clicks: Vec<ClickRecord> = (0..120)
            .map(|_| click(t, None, None, "desktop", "Chrome", "Windows"))
            .collect();
        let view = aggregate(&link_with_count(120), &clicks);
        assert_eq!(view.recent_clicks.len(), 50);
        // 但聚合用的是全部样本
        assert_eq!(view.browsers[0].count, 120);
    }
}
