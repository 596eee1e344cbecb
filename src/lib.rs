//! linkloom
//!
//! 多租户短链服务：token 分配、读穿缓存的重定向解析、
//! 惰性门控（停用 / 过期 / 点击上限）、异步点击遥测、
//! 读时聚合的点击分析，以及按套餐的链接配额。

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod services;
pub mod storage;
pub mod telemetry;
pub mod utils;
