use sqlx::{Error as SqlxError, PgExecutor, Postgres, QueryBuilder};
use tracing::instrument;

use crate::database::connection::DbConnection;
use crate::error::RequestError;
use crate::models::api_key::ApiKey;
use crate::models::filters::ResourceFilters;
use crate::models::pagination::{Page, PageRequest};
use crate::models::resource::{Resource, ResourceId};
use crate::models::taxonomy::{NewTaxon, Resolved, Taxon};

/// Resource columns with the category name and the ordered language names folded in.
const SELECT_RESOURCES: &str = "
    SELECT
        r.id AS id, r.name AS name, r.url AS url, c.name AS category,
        ARRAY(
            SELECT l.name
            FROM resource_languages rl JOIN languages l ON rl.language_id = l.id
            WHERE rl.resource_id = r.id
            ORDER BY rl.position
        ) AS languages,
        r.paid AS paid, r.notes AS notes,
        r.upvotes AS upvotes, r.downvotes AS downvotes, r.times_clicked AS times_clicked,
        r.created_at AS created_at, r.last_updated AS last_updated
    FROM
        resources r JOIN categories c ON r.category_id = c.id
";

impl DbConnection {
    pub async fn get_resource(&self, id: ResourceId) -> Result<Option<Resource>, SqlxError> {
        get_resource(self.pool(), id).await
    }

    pub async fn list_resources(
        &self,
        filters: &ResourceFilters,
        page: &PageRequest,
    ) -> Result<Page<Resource>, RequestError> {
        let total_count = count_resources(self.pool(), filters).await?;
        let details = page.details(total_count)?;
        let items = list_resources(self.pool(), filters, page).await?;
        Ok(Page { items, details })
    }

    pub async fn get_taxon<T: Taxon>(&self, id: i32) -> Result<Option<T>, SqlxError> {
        get_taxon(self.pool(), id).await
    }

    pub async fn list_taxa<T: Taxon>(&self, page: &PageRequest) -> Result<Page<T>, RequestError> {
        let total_count = count_taxa::<T, _>(self.pool()).await?;
        let details = page.details(total_count)?;
        let items = list_taxa(self.pool(), page).await?;
        Ok(Page { items, details })
    }

    pub async fn find_api_key(&self, apikey: &str) -> Result<Option<ApiKey>, SqlxError> {
        find_api_key(self.pool(), apikey).await
    }

    pub async fn find_api_key_by_email(&self, email: &str) -> Result<Option<ApiKey>, SqlxError> {
        find_api_key_by_email(self.pool(), email).await
    }
}

#[instrument(skip(executor))]
pub async fn get_resource<'a, E: PgExecutor<'a>>(
    executor: E,
    id: ResourceId,
) -> Result<Option<Resource>, SqlxError> {
    let query = format!("{SELECT_RESOURCES} WHERE r.id = $1;");
    sqlx::query_as(&query)
        .bind(id)
        .fetch_optional(executor)
        .await
}

#[instrument(skip(executor))]
pub async fn count_resources<'a, E: PgExecutor<'a>>(
    executor: E,
    filters: &ResourceFilters,
) -> Result<i64, SqlxError> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT COUNT(*) FROM resources r JOIN categories c ON r.category_id = c.id WHERE TRUE",
    );
    filters.push_predicates(&mut builder);
    builder.build_query_scalar::<i64>().fetch_one(executor).await
}

#[instrument(skip(executor))]
pub async fn list_resources<'a, E: PgExecutor<'a>>(
    executor: E,
    filters: &ResourceFilters,
    page: &PageRequest,
) -> Result<Vec<Resource>, SqlxError> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_RESOURCES);
    builder.push(" WHERE TRUE");
    filters.push_predicates(&mut builder);
    builder
        .push(" ORDER BY r.id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    builder.build_query_as::<Resource>().fetch_all(executor).await
}

#[instrument(skip(executor), fields(table = T::TABLE))]
pub async fn find_taxon_by_name<'a, T: Taxon, E: PgExecutor<'a>>(
    executor: E,
    name: &str,
) -> Result<Option<T>, SqlxError> {
    let query = format!(
        "SELECT id, name FROM {} WHERE lower(name) = lower($1);",
        T::TABLE
    );
    sqlx::query_as(&query)
        .bind(name)
        .fetch_optional(executor)
        .await
}

/// Looks a tag up case-insensitively, falling back to an unsaved value.
pub async fn resolve_taxon<'a, T: Taxon, E: PgExecutor<'a>>(
    executor: E,
    name: &str,
) -> Result<Resolved<T>, SqlxError> {
    let resolved = match find_taxon_by_name(executor, name).await? {
        Some(existing) => Resolved::Existing(existing),
        None => Resolved::New(NewTaxon {
            name: name.to_string(),
        }),
    };
    Ok(resolved)
}

#[instrument(skip(executor), fields(table = T::TABLE))]
pub async fn get_taxon<'a, T: Taxon, E: PgExecutor<'a>>(
    executor: E,
    id: i32,
) -> Result<Option<T>, SqlxError> {
    let query = format!("SELECT id, name FROM {} WHERE id = $1;", T::TABLE);
    sqlx::query_as(&query)
        .bind(id)
        .fetch_optional(executor)
        .await
}

#[instrument(skip(executor), fields(table = T::TABLE))]
pub async fn count_taxa<'a, T: Taxon, E: PgExecutor<'a>>(executor: E) -> Result<i64, SqlxError> {
    let query = format!("SELECT COUNT(*) FROM {};", T::TABLE);
    sqlx::query_scalar(&query).fetch_one(executor).await
}

#[instrument(skip(executor), fields(table = T::TABLE))]
pub async fn list_taxa<'a, T: Taxon, E: PgExecutor<'a>>(
    executor: E,
    page: &PageRequest,
) -> Result<Vec<T>, SqlxError> {
    let query = format!(
        "SELECT id, name FROM {} ORDER BY id LIMIT $1 OFFSET $2;",
        T::TABLE
    );
    sqlx::query_as(&query)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(executor)
        .await
}

#[instrument(skip_all)]
pub async fn find_api_key<'a, E: PgExecutor<'a>>(
    executor: E,
    apikey: &str,
) -> Result<Option<ApiKey>, SqlxError> {
    sqlx::query_as("SELECT id, email, apikey, created_at FROM api_keys WHERE apikey = $1;")
        .bind(apikey)
        .fetch_optional(executor)
        .await
}

#[instrument(skip(executor))]
pub async fn find_api_key_by_email<'a, E: PgExecutor<'a>>(
    executor: E,
    email: &str,
) -> Result<Option<ApiKey>, SqlxError> {
    sqlx::query_as("SELECT id, email, apikey, created_at FROM api_keys WHERE email = $1;")
        .bind(email)
        .fetch_optional(executor)
        .await
}
