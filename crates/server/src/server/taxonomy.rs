use std::sync::Arc;

use axum::extract::State;

use crate::config::PaginatorConfig;
use crate::error::RequestError;
use crate::models::pagination::{PageQuery, Paginator};
use crate::models::taxonomy::{Category, Language, Taxon};
use crate::server::envelope::Envelope;
use crate::server::extract::{IdPath, ParamQuery};
use crate::server::state::AppState;

pub async fn list_languages(
    State(state): State<Arc<AppState>>,
    ParamQuery(query): ParamQuery<PageQuery>,
) -> Result<Envelope<Vec<Language>>, RequestError> {
    list_taxa(&state, state.config.pagination.languages, &query).await
}

pub async fn get_language(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<Envelope<Language>, RequestError> {
    get_taxon(&state, id).await
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    ParamQuery(query): ParamQuery<PageQuery>,
) -> Result<Envelope<Vec<Category>>, RequestError> {
    list_taxa(&state, state.config.pagination.categories, &query).await
}

pub async fn get_category(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<Envelope<Category>, RequestError> {
    get_taxon(&state, id).await
}

async fn list_taxa<T: Taxon>(
    state: &AppState,
    config: PaginatorConfig,
    query: &PageQuery,
) -> Result<Envelope<Vec<T>>, RequestError> {
    let page = Paginator::relational(config).request(query)?;
    let page = state.db_connection.list_taxa::<T>(&page).await?;
    Ok(Envelope::page(page))
}

async fn get_taxon<T: Taxon>(state: &AppState, id: i32) -> Result<Envelope<T>, RequestError> {
    let taxon = state
        .db_connection
        .get_taxon::<T>(id)
        .await?
        .ok_or(RequestError::NotFound)?;
    Ok(Envelope::data(taxon))
}
