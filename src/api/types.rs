//! API DTO 与错误响应

use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

use crate::errors::LinkloomError;
use crate::storage::models::{FieldPatch, Link, LinkPatch, Owner};

/// 缺字段 / 显式 null / 有值 三态反序列化：
/// 字段缺失得到 None（Keep），显式 null 得到 Some(None)（Clear）
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub destination: String,
    #[serde(default)]
    pub custom_token: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_clicks: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkRequest {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub max_clicks: Option<Option<u32>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

fn to_field_patch<T>(field: Option<Option<T>>) -> FieldPatch<T> {
    match field {
        None => FieldPatch::Keep,
        Some(Some(v)) => FieldPatch::Set(v),
        Some(None) => FieldPatch::Clear,
    }
}

impl From<UpdateLinkRequest> for LinkPatch {
    fn from(req: UpdateLinkRequest) -> Self {
        LinkPatch {
            destination: req.destination,
            title: to_field_patch(req.title),
            description: to_field_patch(req.description),
            expires_at: to_field_patch(req.expires_at),
            max_clicks: to_field_patch(req.max_clicks),
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkIdsRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkActiveRequest {
    pub ids: Vec<String>,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub plan: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: String,
    pub token: String,
    pub short_url: String,
    pub destination: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<u32>,
    pub click_count: u64,
    pub is_active: bool,
}

impl LinkResponse {
    pub fn from_link(link: Link, public_base_url: &str) -> Self {
        let short_url = format!("{}/{}", public_base_url.trim_end_matches('/'), link.token);
        Self {
            id: link.id,
            token: link.token,
            short_url,
            destination: link.destination,
            title: link.title,
            description: link.description,
            created_at: link.created_at,
            expires_at: link.expires_at,
            max_clicks: link.max_clicks,
            click_count: link.click_count,
            is_active: link.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub id: String,
    pub plan: String,
    pub link_limit: u32,
    pub active_link_count: u32,
}

impl From<Owner> for OwnerResponse {
    fn from(owner: Owner) -> Self {
        Self {
            id: owner.id,
            plan: owner.plan.as_str().to_string(),
            link_limit: owner.link_limit,
            active_link_count: owner.active_link_count,
        }
    }
}

/// 统一的错误响应：{code, error}，配额错误额外带 used/limit
pub fn error_response(err: &LinkloomError) -> HttpResponse {
    let mut body = json!({
        "code": err.code(),
        "error": err.message(),
    });

    if let LinkloomError::QuotaExceeded { used, limit } = err {
        body["used"] = json!(used);
        body["limit"] = json!(limit);
    }

    let mut builder = match err {
        LinkloomError::Validation(_) | LinkloomError::InvalidDestination(_) => {
            HttpResponse::BadRequest()
        }
        LinkloomError::Unauthorized(_) => HttpResponse::Unauthorized(),
        LinkloomError::Forbidden(_) => HttpResponse::Forbidden(),
        LinkloomError::NotFound(_) => HttpResponse::NotFound(),
        LinkloomError::TokenConflict(_) | LinkloomError::QuotaExceeded { .. } => {
            HttpResponse::Conflict()
        }
        _ => HttpResponse::InternalServerError(),
    };

    builder.json(body)
}

impl actix_web::ResponseError for LinkloomError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            LinkloomError::Validation(_) | LinkloomError::InvalidDestination(_) => {
                StatusCode::BAD_REQUEST
            }
            LinkloomError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LinkloomError::Forbidden(_) => StatusCode::FORBIDDEN,
            LinkloomError::NotFound(_) => StatusCode::NOT_FOUND,
            LinkloomError::TokenConflict(_) | LinkloomError::QuotaExceeded { .. } => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_tri_state() {
        // 缺字段 → Keep
        let req: UpdateLinkRequest = serde_json::from_str("{}").unwrap();
        let patch: LinkPatch = req.into();
        assert!(patch.is_empty());

        // 显式 null → Clear
        let req: UpdateLinkRequest = serde_json::from_str(r#"{"expiresAt": null}"#).unwrap();
        let patch: LinkPatch = req.into();
        assert_eq!(patch.expires_at, FieldPatch::Clear);

        // 有值 → Set
        let req: UpdateLinkRequest =
            serde_json::from_str(r#"{"maxClicks": 10, "title": "hi"}"#).unwrap();
        let patch: LinkPatch = req.into();
        assert_eq!(patch.max_clicks, FieldPatch::Set(10));
        assert_eq!(patch.title, FieldPatch::Set("hi".to_string()));
    }

    #[test]
    fn test_short_url_has_no_double_slash() {
        let link = Link {
            id: "l-1".to_string(),
            owner_id: "o-1".to_string(),
            token: "aB3xY9z".to_string(),
            destination: "https://example.com".to_string(),
            title: None,
            description: None,
            created_at: Utc::now(),
            expires_at: None,
            max_clicks: None,
            click_count: 0,
            is_active: true,
        };
        let resp = LinkResponse::from_link(link, "https://lnk.example/");
        assert_eq!(resp.short_url, "https://lnk.example/aB3xY9z");
    }
}
