//! Resource writes that span the relational store and the search index.
//!
//! The relational commit always comes first and decides the outcome of the
//! request. Mirroring into the index happens afterwards, once, and a failure
//! there is logged and otherwise ignored.

use tracing::{info, warn};

use crate::database::connection::DbConnection;
use crate::database::utils::map_integrity_violation;
use crate::error::RequestError;
use crate::models::resource::{CreateResource, Resource, ResourceId, UpdateResource};
use crate::search::{PartialIndexRecord, SearchIndex, SearchIndexRecord};

pub struct ResourceCatalog<'a> {
    db: &'a DbConnection,
    index: &'a dyn SearchIndex,
}

impl<'a> ResourceCatalog<'a> {
    pub fn new(db: &'a DbConnection, index: &'a dyn SearchIndex) -> Self {
        Self { db, index }
    }

    pub async fn create(&self, resource: &CreateResource) -> Result<Resource, RequestError> {
        let created = self
            .db
            .create_resource(resource)
            .await
            .map_err(map_integrity_violation)?;
        self.mirror_created(&created).await;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: ResourceId,
        update: &UpdateResource,
    ) -> Result<Resource, RequestError> {
        let updated = self
            .db
            .update_resource(id, update)
            .await
            .map_err(map_integrity_violation)?
            .ok_or(RequestError::NotFound)?;
        self.mirror_updated(&updated, update).await;
        Ok(updated)
    }

    async fn mirror_created(&self, resource: &Resource) {
        let record = SearchIndexRecord::from(resource);
        match self.index.save_object(&record).await {
            Ok(()) => info!("indexed new resource with id: {}", resource.id),
            Err(e) => warn!(
                "search index failed to index new resource '{}' (id {}): {e}",
                resource.name, resource.id
            ),
        }
    }

    async fn mirror_updated(&self, resource: &Resource, update: &UpdateResource) {
        let record = PartialIndexRecord::from_update(resource, update);
        match self.index.partial_update_object(&record).await {
            Ok(()) => info!("updated index entry for resource with id: {}", resource.id),
            Err(e) => warn!(
                "search index failed to update resource '{}' (id {}): {e}",
                resource.name, resource.id
            ),
        }
    }
}
