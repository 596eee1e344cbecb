//! SeaORM storage backend
//!
//! Persists owners, links and clicks via SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod click_sink;
mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::config::StorageConfig;
use crate::errors::{LinkloomError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{
    click_to_record, link_to_model, model_to_link, model_to_owner, new_link_to_active_model,
};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(LinkloomError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct LinkStore {
    db: DatabaseConnection,
    backend_name: String,
    /// 重试配置
    retry_config: retry::RetryConfig,
}

impl LinkStore {
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        if config.database_url.is_empty() {
            return Err(LinkloomError::database_config(
                "DATABASE_URL 未设置".to_string(),
            ));
        }

        let backend_name = infer_backend_from_url(&config.database_url)?;

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(&config.database_url).await?
        } else {
            connect_generic(config, &backend_name).await?
        };

        let store = LinkStore {
            db,
            backend_name,
            retry_config: retry::RetryConfig::default(),
        };

        // 运行迁移
        run_migrations(&store.db).await?;

        warn!("{} Storage initialized.", store.backend_name.to_uppercase());
        Ok(store)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 获取数据库连接（测试和迁移工具使用）
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub(super) fn retry_config(&self) -> retry::RetryConfig {
        self.retry_config
    }
}
