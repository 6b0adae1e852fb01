//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Feed query configuration.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Avatar URL configuration.
    #[serde(default)]
    pub avatar: AvatarConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`postgres://…` or `sqlite://…`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Feed query configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Number of posts in one feed page when the caller gives no limit.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

/// Avatar URL configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarConfig {
    /// Base URL of the identicon service; the digest is appended as a path segment.
    #[serde(default = "default_avatar_base_url")]
    pub base_url: String,
    /// Size in pixels used when the caller gives none.
    #[serde(default = "default_avatar_size")]
    pub default_size: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            base_url: default_avatar_base_url(),
            default_size: default_avatar_size(),
        }
    }
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_min_connections() -> u32 {
    1
}

const fn default_page_size() -> u64 {
    25
}

fn default_avatar_base_url() -> String {
    "https://www.gravatar.com/avatar".to_string()
}

const fn default_avatar_size() -> u32 {
    128
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `MICROBLOG_ENV`)
    /// 3. Environment variables with `MICROBLOG_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("MICROBLOG_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MICROBLOG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("MICROBLOG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
