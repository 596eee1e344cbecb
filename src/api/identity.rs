//! 请求身份提取
//!
//! Bearer 凭证被当作外部身份系统已验证过的 subject id 原样使用，
//! 这里不做任何签名校验。首次见到的 subject 自动落 owner 行。

use actix_web::HttpRequest;

use crate::errors::{LinkloomError, Result};
use crate::storage::LinkStore;
use crate::storage::models::Owner;

/// 从 Authorization: Bearer <subject> 中取出 subject id
pub fn subject_from(req: &HttpRequest) -> Result<String> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| LinkloomError::unauthorized("缺少 Authorization 头".to_string()))?;

    let subject = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LinkloomError::unauthorized("凭证格式不正确".to_string()))?;

    Ok(subject.to_string())
}

/// 提取 subject 并确保 owner 行存在（首访自动建 free 套餐）
pub async fn authenticate(req: &HttpRequest, store: &LinkStore) -> Result<Owner> {
    let subject = subject_from(req)?;
    store.ensure_owner(&subject).await
}
