use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkloom::api;
use linkloom::cache::{MokaRedirectCache, RedirectCache};
use linkloom::config::Config;
use linkloom::services::{AnalyticsService, LinkService, RedirectService};
use linkloom::storage::LinkStore;
use linkloom::telemetry::{ClickRecorder, ClickSink};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    let store = Arc::new(
        LinkStore::new(&config.storage)
            .await
            .expect("Failed to initialize storage"),
    );

    let cache: Arc<dyn RedirectCache> = Arc::new(MokaRedirectCache::new(&config.cache));

    let sink: Arc<dyn ClickSink> = store.clone();
    let (recorder, _recorder_handle) = ClickRecorder::spawn(
        sink,
        config.telemetry.queue_capacity,
        config.telemetry_write_timeout(),
    );

    let link_service = LinkService::new(store.clone(), cache.clone());
    let redirect_service = RedirectService::new(store.clone(), cache.clone(), recorder);
    let analytics_service = AnalyticsService::new(store.clone());

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);

    let app_config = config.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(link_service.clone()))
            .app_data(web::Data::new(redirect_service.clone()))
            .app_data(web::Data::new(analytics_service.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .configure(api::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
