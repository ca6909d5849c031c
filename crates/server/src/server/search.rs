use std::sync::Arc;

use axum::extract::State;
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::error::RequestError;
use crate::models::filters::{FilterQuery, ResourceFilters};
use crate::models::pagination::{Page, PageQuery, PaginationDetails, Paginator};
use crate::search::{SearchHit, SearchQuery};
use crate::server::envelope::Envelope;
use crate::server::extract::ParamQuery;
use crate::server::state::AppState;

/// Query parameters of `/search`. Pages count from 0, like the index does.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
    page: Option<i64>,
    page_size: Option<i64>,
    #[serde(default)]
    languages: Vec<String>,
    category: Option<String>,
    paid: Option<String>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    ParamQuery(params): ParamQuery<SearchParams>,
) -> Result<Envelope<Vec<SearchHit>>, RequestError> {
    let filters = ResourceFilters::from_query(
        &FilterQuery {
            languages: params.languages,
            category: params.category,
            updated_after: None,
            paid: params.paid,
        },
        Utc::now(),
    )?;
    let page = Paginator::search(state.config.pagination.resources).request(&PageQuery {
        page: params.page,
        page_size: params.page_size,
    })?;
    let query = SearchQuery {
        query: params.q,
        filters: filters.search_expression(),
        page: page.page,
        hits_per_page: page.limit(),
    };
    debug!("searching index with filters: {:?}", query.filters);

    let response = state.search_index.search(&query).await?;
    page.ensure_in_range(response.nb_pages)?;

    let items = response
        .hits
        .into_iter()
        .filter_map(SearchHit::from_record)
        .collect();
    Ok(Envelope::page(Page {
        items,
        details: PaginationDetails {
            page: response.page,
            number_of_pages: response.nb_pages,
            records_per_page: response.hits_per_page,
            total_count: response.nb_hits,
        },
    }))
}
