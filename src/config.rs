//! Runtime configuration, read once from the environment at startup.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Base URL the public short form is rendered against, e.g. `https://lnk.example`.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    /// 缓存条目默认存活时间（秒）
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_database_url() -> String {
    "sqlite://linkloom.db".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_cache_capacity() -> u64 {
    100_000
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_write_timeout_secs() -> u64 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            write_timeout_secs: default_write_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Config {
    /// Build the configuration from environment variables, falling back to
    /// defaults for anything unset. `.env` loading is the caller's concern.
    pub fn from_env() -> Self {
        let config = Self {
            server: ServerConfig {
                host: env_or("SERVER_HOST", default_server_host),
                port: env_parse_or("SERVER_PORT", default_server_port),
                public_base_url: env_or("PUBLIC_BASE_URL", default_public_base_url),
            },
            storage: StorageConfig {
                database_url: env_or("DATABASE_URL", default_database_url),
                max_connections: env_parse_or("DB_MAX_CONNECTIONS", default_max_connections),
                min_connections: env_parse_or("DB_MIN_CONNECTIONS", default_min_connections),
                connect_timeout_secs: env_parse_or(
                    "DB_CONNECT_TIMEOUT",
                    default_connect_timeout_secs,
                ),
            },
            cache: CacheConfig {
                capacity: env_parse_or("CACHE_CAPACITY", default_cache_capacity),
                ttl_secs: env_parse_or("CACHE_TTL", default_cache_ttl_secs),
            },
            telemetry: TelemetryConfig {
                queue_capacity: env_parse_or("TELEMETRY_QUEUE_CAPACITY", default_queue_capacity),
                write_timeout_secs: env_parse_or(
                    "TELEMETRY_WRITE_TIMEOUT",
                    default_write_timeout_secs,
                ),
            },
        };
        debug!("Config loaded: {:?}", config);
        config
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn telemetry_write_timeout(&self) -> Duration {
        Duration::from_secs(self.telemetry.write_timeout_secs)
    }
}

fn env_or(key: &str, default: fn() -> String) -> String {
    env::var(key).unwrap_or_else(|_| default())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: fn() -> T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(default)
}
