use std::sync::Arc;

use crate::auth::membership::{HttpMembershipVerifier, MembershipVerifier};
use crate::catalog::ResourceCatalog;
use crate::config::AppConfig;
use crate::database::connection::DbConnection;
use crate::search::algolia::AlgoliaIndex;
use crate::search::SearchIndex;

pub struct AppState {
    pub config: AppConfig,
    pub db_connection: DbConnection,
    pub search_index: Arc<dyn SearchIndex>,
    pub membership: Arc<dyn MembershipVerifier>,
}

impl AppState {
    pub async fn try_init(config: &AppConfig) -> anyhow::Result<Self> {
        let db_connection = DbConnection::connect(&config.database).await?;
        let search_index = Arc::new(AlgoliaIndex::new(&config.search)?);
        let membership = Arc::new(HttpMembershipVerifier::new(&config.membership)?);
        Ok(Self {
            config: config.clone(),
            db_connection,
            search_index,
            membership,
        })
    }

    pub fn catalog(&self) -> ResourceCatalog<'_> {
        ResourceCatalog::new(&self.db_connection, self.search_index.as_ref())
    }
}
