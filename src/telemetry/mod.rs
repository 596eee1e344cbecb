//! 点击遥测
//!
//! 重定向返回后异步落库：记录失败只影响统计，绝不影响跳转。

mod recorder;
mod sink;

use chrono::{DateTime, Utc};

pub use recorder::ClickRecorder;
pub use sink::ClickSink;

/// 一次待记录的点击，在请求线程上构造完毕后整体入队
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: String,
    pub occurred_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub device_type: String,
    pub browser: String,
    pub os: String,
}
