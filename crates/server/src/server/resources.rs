use std::sync::Arc;

use axum::extract::State;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::auth::api_key::Authenticated;
use crate::error::{RequestError, ValidationError};
use crate::models::filters::{FilterQuery, ResourceFilters};
use crate::models::pagination::{PageQuery, Paginator};
use crate::models::resource::{Counter, Resource, ResourcePayload};
use crate::server::envelope::Envelope;
use crate::server::extract::{IdPath, JsonBody, ParamQuery};
use crate::server::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ResourceListQuery {
    page: Option<i64>,
    page_size: Option<i64>,
    #[serde(default)]
    languages: Vec<String>,
    category: Option<String>,
    updated_after: Option<String>,
    paid: Option<String>,
}

impl ResourceListQuery {
    fn split(self) -> (PageQuery, FilterQuery) {
        let page = PageQuery {
            page: self.page,
            page_size: self.page_size,
        };
        let filters = FilterQuery {
            languages: self.languages,
            category: self.category,
            updated_after: self.updated_after,
            paid: self.paid,
        };
        (page, filters)
    }
}

pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    ParamQuery(query): ParamQuery<ResourceListQuery>,
) -> Result<Envelope<Vec<Resource>>, RequestError> {
    let (page_query, filter_query) = query.split();
    let filters = ResourceFilters::from_query(&filter_query, Utc::now())?;
    let page = Paginator::relational(state.config.pagination.resources).request(&page_query)?;
    let page = state.db_connection.list_resources(&filters, &page).await?;
    Ok(Envelope::page(page))
}

pub async fn get_resource(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<Envelope<Resource>, RequestError> {
    let resource = state
        .db_connection
        .get_resource(id)
        .await?
        .ok_or(RequestError::NotFound)?;
    Ok(Envelope::data(resource))
}

pub async fn create_resource(
    State(state): State<Arc<AppState>>,
    caller: Authenticated,
    JsonBody(payload): JsonBody<ResourcePayload>,
) -> Result<Envelope<Resource>, RequestError> {
    let resource = payload.into_create()?;
    let created = state.catalog().create(&resource).await?;
    info!("resource {} created by {}", created.id, caller.key.email);
    Ok(Envelope::data(created))
}

pub async fn update_resource(
    State(state): State<Arc<AppState>>,
    caller: Authenticated,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<ResourcePayload>,
) -> Result<Envelope<Resource>, RequestError> {
    let update = payload.into_update()?;
    if update.is_empty() {
        return Err(ValidationError::MissingBody.into());
    }
    let updated = state.catalog().update(id, &update).await?;
    info!("resource {id} updated by {}", caller.key.email);
    Ok(Envelope::data(updated))
}

pub async fn upvote(
    state: State<Arc<AppState>>,
    id: IdPath,
) -> Result<Envelope<Resource>, RequestError> {
    bump(state, id, Counter::Upvotes).await
}

pub async fn downvote(
    state: State<Arc<AppState>>,
    id: IdPath,
) -> Result<Envelope<Resource>, RequestError> {
    bump(state, id, Counter::Downvotes).await
}

pub async fn click(
    state: State<Arc<AppState>>,
    id: IdPath,
) -> Result<Envelope<Resource>, RequestError> {
    bump(state, id, Counter::TimesClicked).await
}

async fn bump(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
    counter: Counter,
) -> Result<Envelope<Resource>, RequestError> {
    let resource = state
        .db_connection
        .increment_counter(id, counter)
        .await?
        .ok_or(RequestError::NotFound)?;
    info!("incremented {counter} of resource {id}");
    Ok(Envelope::data(resource))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_splits_into_page_and_filters() {
        let query = ResourceListQuery {
            page: Some(2),
            page_size: Some(5),
            languages: vec!["rust".to_string()],
            paid: Some("false".to_string()),
            ..Default::default()
        };
        let (page, filters) = query.split();
        assert_eq!(page.page, Some(2));
        assert_eq!(page.page_size, Some(5));
        assert_eq!(filters.languages, vec!["rust".to_string()]);
        assert_eq!(filters.paid.as_deref(), Some("false"));
        assert!(filters.category.is_none());
    }
}
