//! 路由处理器

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use tracing::trace;

use super::identity;
use super::types::{
    BulkActiveRequest, BulkIdsRequest, CreateLinkRequest, LinkResponse, OwnerResponse,
    PlanRequest, UpdateLinkRequest,
};
use crate::config::Config;
use crate::errors::{LinkloomError, Result};
use crate::services::link_service::CreateLink;
use crate::services::redirect::ClickContext;
use crate::services::{AnalyticsService, LinkService, RedirectService, ResolveOutcome};
use crate::storage::LinkStore;
use crate::storage::models::{LinkPatch, Plan};

type ApiResult = Result<HttpResponse>;

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// 从请求头拼出点击上下文。代理头缺失时回退到对端地址；
/// 地理信息只在边缘代理给出时存在，这里不做解析。
fn click_context(req: &HttpRequest) -> ClickContext {
    let ip_address = header(req, "X-Forwarded-For")
        .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()));

    ClickContext {
        ip_address,
        country: header(req, "CF-IPCountry"),
        city: None,
        referrer: header(req, "Referer"),
        user_agent: header(req, "User-Agent"),
    }
}

pub async fn redirect(
    req: HttpRequest,
    path: web::Path<String>,
    service: web::Data<RedirectService>,
) -> ApiResult {
    let token = path.into_inner();
    trace!("Redirect request for token: {}", token);

    match service.resolve(&token, click_context(&req)).await? {
        ResolveOutcome::Redirect(destination) => Ok(HttpResponse::TemporaryRedirect()
            .append_header(("Location", destination))
            .finish()),
        ResolveOutcome::NotFoundOrGated => Ok(HttpResponse::NotFound().json(json!({
            "code": LinkloomError::not_found("").code(),
            "error": "link not found",
        }))),
    }
}

pub async fn create_link(
    req: HttpRequest,
    payload: web::Json<CreateLinkRequest>,
    store: web::Data<Arc<LinkStore>>,
    links: web::Data<LinkService>,
    config: web::Data<Config>,
) -> ApiResult {
    let owner = identity::authenticate(&req, &store).await?;
    let input = payload.into_inner();

    let link = links
        .create_link(
            &owner.id,
            CreateLink {
                destination: input.destination,
                custom_token: input.custom_token,
                title: input.title,
                description: input.description,
                expires_at: input.expires_at,
                max_clicks: input.max_clicks,
            },
        )
        .await?;

    Ok(HttpResponse::Created()
        .json(LinkResponse::from_link(link, &config.server.public_base_url)))
}

pub async fn list_links(
    req: HttpRequest,
    store: web::Data<Arc<LinkStore>>,
    links: web::Data<LinkService>,
    config: web::Data<Config>,
) -> ApiResult {
    let owner = identity::authenticate(&req, &store).await?;
    let all = links.list_links(&owner.id).await?;

    let base = &config.server.public_base_url;
    let body: Vec<LinkResponse> = all
        .into_iter()
        .map(|link| LinkResponse::from_link(link, base))
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

pub async fn get_link(
    req: HttpRequest,
    path: web::Path<String>,
    store: web::Data<Arc<LinkStore>>,
    links: web::Data<LinkService>,
    config: web::Data<Config>,
) -> ApiResult {
    let owner = identity::authenticate(&req, &store).await?;
    let link = links.get_link(&owner.id, &path).await?;

    Ok(HttpResponse::Ok()
        .json(LinkResponse::from_link(link, &config.server.public_base_url)))
}

pub async fn update_link(
    req: HttpRequest,
    path: web::Path<String>,
    payload: web::Json<UpdateLinkRequest>,
    store: web::Data<Arc<LinkStore>>,
    links: web::Data<LinkService>,
    config: web::Data<Config>,
) -> ApiResult {
    let owner = identity::authenticate(&req, &store).await?;
    let patch: LinkPatch = payload.into_inner().into();
    let link = links.update_link(&owner.id, &path, patch).await?;

    Ok(HttpResponse::Ok()
        .json(LinkResponse::from_link(link, &config.server.public_base_url)))
}

pub async fn delete_link(
    req: HttpRequest,
    path: web::Path<String>,
    store: web::Data<Arc<LinkStore>>,
    links: web::Data<LinkService>,
) -> ApiResult {
    let owner = identity::authenticate(&req, &store).await?;
    links.delete_link(&owner.id, &path).await?;

    Ok(HttpResponse::NoContent().finish())
}

pub async fn bulk_delete(
    req: HttpRequest,
    payload: web::Json<BulkIdsRequest>,
    store: web::Data<Arc<LinkStore>>,
    links: web::Data<LinkService>,
) -> ApiResult {
    let owner = identity::authenticate(&req, &store).await?;
    let deleted = links.bulk_delete(&owner.id, &payload.ids).await?;

    Ok(HttpResponse::Ok().json(json!({ "deleted": deleted })))
}

pub async fn bulk_set_active(
    req: HttpRequest,
    payload: web::Json<BulkActiveRequest>,
    store: web::Data<Arc<LinkStore>>,
    links: web::Data<LinkService>,
) -> ApiResult {
    let owner = identity::authenticate(&req, &store).await?;
    let affected = links
        .bulk_set_active(&owner.id, &payload.ids, payload.is_active)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "affected": affected })))
}

pub async fn link_analytics(
    req: HttpRequest,
    path: web::Path<String>,
    store: web::Data<Arc<LinkStore>>,
    analytics: web::Data<AnalyticsService>,
) -> ApiResult {
    let owner = identity::authenticate(&req, &store).await?;
    let view = analytics.link_analytics(&owner.id, &path).await?;

    Ok(HttpResponse::Ok().json(view))
}

pub async fn set_plan(
    req: HttpRequest,
    payload: web::Json<PlanRequest>,
    store: web::Data<Arc<LinkStore>>,
    links: web::Data<LinkService>,
) -> ApiResult {
    let owner = identity::authenticate(&req, &store).await?;

    let plan = Plan::parse(&payload.plan)
        .ok_or_else(|| LinkloomError::validation(format!("未知套餐: {}", payload.plan)))?;

    let updated = links.quota().set_plan(&owner.id, plan).await?;
    Ok(HttpResponse::Ok().json(OwnerResponse::from(updated)))
}

pub async fn health(store: web::Data<Arc<LinkStore>>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "backend": store.backend_name(),
    }))
}
