use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::{debug, instrument};

use crate::config::SearchConfig;
use crate::search::{
    PartialIndexRecord, SearchError, SearchIndex, SearchIndexRecord, SearchQuery, SearchResponse,
};

const APP_ID_HEADER: &str = "X-Algolia-Application-Id";
const API_KEY_HEADER: &str = "X-Algolia-API-Key";

/// REST client for an Algolia index.
pub struct AlgoliaIndex {
    client: Client,
    base_url: String,
    index_name: String,
    app_id: String,
    api_key: String,
}

impl AlgoliaIndex {
    pub fn new(config: &SearchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to create search index HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url(),
            index_name: config.index_name.clone(),
            app_id: config.app_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn index_url(&self, path: &str) -> String {
        format!("{}/1/indexes/{}/{}", self.base_url, self.index_name, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.index_url(path))
            .header(APP_ID_HEADER, &self.app_id)
            .header(API_KEY_HEADER, &self.api_key)
    }
}

async fn ensure_success(response: Response) -> Result<Response, SearchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SearchError::Rejected { status, body })
}

#[async_trait]
impl SearchIndex for AlgoliaIndex {
    #[instrument(skip(self))]
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
        let response = self
            .request(Method::POST, "query")
            .json(query)
            .send()
            .await?;
        let result: SearchResponse = ensure_success(response).await?.json().await?;
        debug!("search returned {} of {} hits", result.hits.len(), result.nb_hits);
        Ok(result)
    }

    #[instrument(skip_all, fields(object_id = %record.object_id))]
    async fn save_object(&self, record: &SearchIndexRecord) -> Result<(), SearchError> {
        let response = self
            .request(Method::PUT, &record.object_id)
            .json(record)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(object_id = %record.object_id))]
    async fn partial_update_object(&self, record: &PartialIndexRecord) -> Result<(), SearchError> {
        let path = format!("{}/partial", record.object_id);
        let response = self
            .request(Method::POST, &path)
            .json(record)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config(base_url: Option<&str>) -> SearchConfig {
        SearchConfig {
            app_id: "APPID".to_string(),
            api_key: "secret".to_string(),
            index_name: "resources".to_string(),
            base_url: base_url.map(str::to_string),
            timeout_secs: Some(1),
        }
    }

    #[test]
    fn urls_follow_index_layout() {
        let index = AlgoliaIndex::new(&config(None)).unwrap();
        assert_eq!(
            index.index_url("query"),
            "https://APPID.algolia.net/1/indexes/resources/query"
        );
        assert_eq!(
            index.index_url("12/partial"),
            "https://APPID.algolia.net/1/indexes/resources/12/partial"
        );
    }

    #[test]
    fn requests_carry_credentials() {
        let index = AlgoliaIndex::new(&config(Some("http://localhost:9200"))).unwrap();
        let request = index.request(Method::PUT, "3").build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:9200/1/indexes/resources/3"
        );
        assert_eq!(request.headers()[APP_ID_HEADER], "APPID");
        assert_eq!(request.headers()[API_KEY_HEADER], "secret");
    }

    #[test]
    fn query_body_uses_index_parameter_names() {
        let query = SearchQuery {
            query: "rust".to_string(),
            filters: "paid=0".to_string(),
            page: 1,
            hits_per_page: 20,
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"query": "rust", "filters": "paid=0", "page": 1, "hitsPerPage": 20})
        );
    }

    #[tokio::test]
    async fn unreachable_index_is_an_error() {
        // Nothing listens on the discard port.
        let index = AlgoliaIndex::new(&config(Some("http://127.0.0.1:9"))).unwrap();
        let record = PartialIndexRecord {
            object_id: "1".to_string(),
            name: Some("x".to_string()),
            url: None,
            category: None,
            languages: None,
            paid: None,
            notes: None,
        };
        let err = index.partial_update_object(&record).await.unwrap_err();
        assert!(matches!(err, SearchError::Unreachable(_)));
    }
}
