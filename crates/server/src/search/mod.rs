//! External full-text search index.
//!
//! The index holds a denormalized, eventually-consistent copy of resources.
//! Writes into it are mirrors of committed relational writes and are allowed
//! to fail; reads from it back the `/search` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod algolia;
pub mod record;

pub use record::{PartialIndexRecord, SearchHit, SearchIndexRecord};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search index unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("search index rejected request with {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: String,
    pub filters: String,
    pub page: i64,
    pub hits_per_page: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub hits: Vec<SearchIndexRecord>,
    pub page: i64,
    pub nb_pages: i64,
    pub hits_per_page: i64,
    pub nb_hits: i64,
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError>;

    /// Creates or fully replaces the record stored under its object id.
    async fn save_object(&self, record: &SearchIndexRecord) -> Result<(), SearchError>;

    /// Overwrites only the attributes carried by `record`.
    async fn partial_update_object(&self, record: &PartialIndexRecord) -> Result<(), SearchError>;
}
