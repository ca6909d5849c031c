use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::membership::{HttpMembershipVerifier, MembershipError, MembershipVerifier};
use crate::config::AppConfig;
use crate::database::connection::{DbConfig, DbConnection};
use crate::search::{
    PartialIndexRecord, SearchError, SearchIndex, SearchIndexRecord, SearchQuery, SearchResponse,
};
use crate::server::state::AppState;

mod api;

const TEST_CONFIG: &str = "
server:
  address: 127.0.0.1:0
database:
  username: resources_guest
  password: resourcespass
  dbname: resources_db
search:
  app_id: TEST
  api_key: secret
  index_name: resources_test
membership:
  url: http://127.0.0.1:9/api/v1/sessions
  timeout_secs: 1
";

pub fn test_db_config() -> DbConfig {
    DbConfig::development("resources_db", "resources_guest", "resourcespass")
}

/// In-memory stand-in for the search index that records every call.
#[derive(Default)]
pub struct FakeIndex {
    pub unavailable: bool,
    pub response: Option<SearchResponse>,
    pub queries: Mutex<Vec<SearchQuery>>,
    pub saved: Mutex<Vec<SearchIndexRecord>>,
    pub partials: Mutex<Vec<PartialIndexRecord>>,
}

impl FakeIndex {
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn answering(response: SearchResponse) -> Self {
        Self {
            response: Some(response),
            ..Default::default()
        }
    }

    fn check_available(&self) -> Result<(), SearchError> {
        if self.unavailable {
            return Err(SearchError::Rejected {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "index is down".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for FakeIndex {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
        self.queries.lock().unwrap().push(query.clone());
        self.check_available()?;
        Ok(self.response.clone().unwrap_or(SearchResponse {
            hits: vec![],
            page: query.page,
            nb_pages: 0,
            hits_per_page: query.hits_per_page,
            nb_hits: 0,
        }))
    }

    async fn save_object(&self, record: &SearchIndexRecord) -> Result<(), SearchError> {
        self.check_available()?;
        self.saved.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn partial_update_object(&self, record: &PartialIndexRecord) -> Result<(), SearchError> {
        self.check_available()?;
        self.partials.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Membership service that gives the same answer to everyone.
pub struct FixedMembership(pub bool);

#[async_trait]
impl MembershipVerifier for FixedMembership {
    async fn verify(&self, _email: &str, _password: &str) -> Result<bool, MembershipError> {
        Ok(self.0)
    }
}

/// State over a lazily connected pool, for requests rejected before any query runs.
pub fn lazy_state(index: Arc<FakeIndex>, membership: bool) -> Arc<AppState> {
    lazy_state_with(index, Arc::new(FixedMembership(membership)))
}

pub fn lazy_state_with(
    index: Arc<FakeIndex>,
    membership: Arc<dyn MembershipVerifier>,
) -> Arc<AppState> {
    let config = AppConfig::from_yaml_str(TEST_CONFIG).unwrap();
    let db_connection = DbConnection::connect_lazy(&config.database).unwrap();
    Arc::new(AppState {
        config,
        db_connection,
        search_index: index,
        membership,
    })
}

pub fn connected_state(
    db_connection: DbConnection,
    index: Arc<FakeIndex>,
    membership: bool,
) -> Arc<AppState> {
    let config = AppConfig::from_yaml_str(TEST_CONFIG).unwrap();
    Arc::new(AppState {
        config,
        db_connection,
        search_index: index,
        membership: Arc::new(FixedMembership(membership)),
    })
}

/// Membership client pointed at the configured, unreachable sessions URL.
pub fn unreachable_membership() -> Arc<dyn MembershipVerifier> {
    let config = AppConfig::from_yaml_str(TEST_CONFIG).unwrap();
    Arc::new(HttpMembershipVerifier::new(&config.membership).unwrap())
}
