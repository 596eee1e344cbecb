//! HTTP 边界：薄 handler 包服务层

pub mod handlers;
pub mod identity;
pub mod types;

use actix_web::web;

/// 路由注册，main 和集成测试共用
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/links", web::post().to(handlers::create_link))
            .route("/links", web::get().to(handlers::list_links))
            .route("/links/bulk-delete", web::post().to(handlers::bulk_delete))
            .route("/links/bulk-active", web::post().to(handlers::bulk_set_active))
            .route("/links/{id}", web::get().to(handlers::get_link))
            .route("/links/{id}", web::put().to(handlers::update_link))
            .route("/links/{id}", web::delete().to(handlers::delete_link))
            .route("/analytics/{token}", web::get().to(handlers::link_analytics))
            .route("/plan", web::post().to(handlers::set_plan)),
    )
    .route("/health", web::get().to(handlers::health))
    .route("/{token}", web::get().to(handlers::redirect))
    .route("/{token}", web::head().to(handlers::redirect));
}
