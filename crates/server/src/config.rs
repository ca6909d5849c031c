use std::fs::read_to_string;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::database::connection::DbConfig;
use crate::server::constants::MAX_LISTING_ELEMENTS;

const OUTBOUND_TIMEOUT_FALLBACK_SECS: u64 = 5;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub address: String,
}

/// Connection settings for the Algolia-compatible search index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    pub app_id: String,
    pub api_key: String,
    pub index_name: String,
    /// Overrides `https://{app_id}.algolia.net`, e.g. for a local stand-in.
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl SearchConfig {
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.algolia.net", self.app_id),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(OUTBOUND_TIMEOUT_FALLBACK_SECS))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MembershipConfig {
    /// Sessions endpoint that accepts `{"user": {"email", "password"}}`.
    pub url: String,
    pub timeout_secs: Option<u64>,
}

impl MembershipConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(OUTBOUND_TIMEOUT_FALLBACK_SECS))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatorConfig {
    pub per_page: i64,
    pub max_page_size: i64,
}

impl PaginatorConfig {
    pub const fn new(per_page: i64, max_page_size: i64) -> Self {
        Self {
            per_page,
            max_page_size,
        }
    }

    /// Configured maximum, never above the server-wide ceiling.
    pub fn max_page_size(&self) -> i64 {
        self.max_page_size.clamp(1, MAX_LISTING_ELEMENTS)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "PaginationConfig::default_resources")]
    pub resources: PaginatorConfig,
    #[serde(default = "PaginationConfig::default_taxonomy")]
    pub languages: PaginatorConfig,
    #[serde(default = "PaginationConfig::default_taxonomy")]
    pub categories: PaginatorConfig,
}

impl PaginationConfig {
    fn default_resources() -> PaginatorConfig {
        PaginatorConfig::new(20, 60)
    }

    fn default_taxonomy() -> PaginatorConfig {
        PaginatorConfig::new(10, 100)
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            resources: Self::default_resources(),
            languages: Self::default_taxonomy(),
            categories: Self::default_taxonomy(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DbConfig,
    pub search: SearchConfig,
    pub membership: MembershipConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl AppConfig {
    pub fn from_yaml_file<P: Into<PathBuf>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.into();
        let content = read_to_string(&path).with_context(|| format!("path: {path:?}"))?;
        Self::from_yaml_str(&content).with_context(|| format!("path: {path:?}"))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, anyhow::Error> {
        Ok(serde_yaml::from_str(content)?)
    }
}
