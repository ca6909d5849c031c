use sqlx::{Error as SqlxError, PgConnection, PgExecutor, Postgres, QueryBuilder, Transaction};
use tracing::{info, instrument};

use crate::database::connection::DbConnection;
use crate::database::queries::{find_taxon_by_name, get_resource, resolve_taxon};
use crate::models::api_key::ApiKey;
use crate::models::resource::{Counter, CreateResource, Resource, ResourceId, UpdateResource};
use crate::models::taxonomy::{Category, Language, LanguageId, Resolved, Taxon};

impl DbConnection {
    /// Inserts a resource together with any tags it introduces, in one transaction.
    pub async fn create_resource(&self, resource: &CreateResource) -> Result<Resource, SqlxError> {
        let mut transaction = self.pool().begin().await?;
        let category =
            resolve_and_persist::<Category>(&mut transaction, &resource.category).await?;
        let language_ids = resolve_languages(&mut transaction, &resource.languages).await?;
        let id = insert_resource(transaction.as_mut(), resource, category.id).await?;
        replace_resource_languages(transaction.as_mut(), id, &language_ids).await?;
        let created = get_resource(transaction.as_mut(), id)
            .await?
            .ok_or(SqlxError::RowNotFound)?;
        transaction.commit().await?;
        info!("created resource with id: {id}");
        Ok(created)
    }

    /// Applies the fields present in `update`; `None` if the resource doesn't exist.
    pub async fn update_resource(
        &self,
        id: ResourceId,
        update: &UpdateResource,
    ) -> Result<Option<Resource>, SqlxError> {
        let mut transaction = self.pool().begin().await?;
        let exists: Option<ResourceId> =
            sqlx::query_scalar("SELECT id FROM resources WHERE id = $1 FOR UPDATE;")
                .bind(id)
                .fetch_optional(transaction.as_mut())
                .await?;
        if exists.is_none() {
            return Ok(None);
        }
        let category_id = match &update.category {
            Some(name) => {
                let category = resolve_and_persist::<Category>(&mut transaction, name).await?;
                Some(category.id)
            }
            None => None,
        };
        if let Some(languages) = &update.languages {
            let language_ids = resolve_languages(&mut transaction, languages).await?;
            replace_resource_languages(transaction.as_mut(), id, &language_ids).await?;
        }
        update_resource_columns(transaction.as_mut(), id, update, category_id).await?;
        let updated = get_resource(transaction.as_mut(), id).await?;
        transaction.commit().await?;
        info!("updated resource with id: {id}");
        Ok(updated)
    }

    /// Bumps one counter by exactly one; `None` if the resource doesn't exist.
    pub async fn increment_counter(
        &self,
        id: ResourceId,
        counter: Counter,
    ) -> Result<Option<Resource>, SqlxError> {
        let mut transaction = self.pool().begin().await?;
        if increment_counter(transaction.as_mut(), id, counter).await?.is_none() {
            return Ok(None);
        }
        let resource = get_resource(transaction.as_mut(), id).await?;
        transaction.commit().await?;
        Ok(resource)
    }

    /// `None` when another key already exists for `email`.
    pub async fn insert_api_key(
        &self,
        email: &str,
        apikey: &str,
    ) -> Result<Option<ApiKey>, SqlxError> {
        insert_api_key(self.pool(), email, apikey).await
    }
}

/// Resolves a tag by name and inserts it when it is new.
pub async fn resolve_and_persist<T: Taxon>(
    transaction: &mut Transaction<'_, Postgres>,
    name: &str,
) -> Result<T, SqlxError> {
    let resolved = resolve_taxon::<T, _>(transaction.as_mut(), name).await?;
    persist_taxon(transaction.as_mut(), resolved).await
}

async fn resolve_languages(
    transaction: &mut Transaction<'_, Postgres>,
    names: &[String],
) -> Result<Vec<LanguageId>, SqlxError> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.push(resolve_and_persist::<Language>(transaction, name).await?.id);
    }
    Ok(ids)
}

/// Inserts a new tag. A concurrent writer may have stored the same name since
/// it was resolved, in which case its row is returned instead.
#[instrument(skip(executor), fields(table = T::TABLE))]
pub async fn persist_taxon<T: Taxon>(
    executor: &mut PgConnection,
    resolved: Resolved<T>,
) -> Result<T, SqlxError> {
    let new = match resolved {
        Resolved::Existing(existing) => return Ok(existing),
        Resolved::New(new) => new,
    };
    let query = format!(
        "
            INSERT INTO {} (name) VALUES ($1)
            ON CONFLICT ((lower(name))) DO NOTHING
            RETURNING id, name;
        ",
        T::TABLE
    );
    let inserted: Option<T> = sqlx::query_as(&query)
        .bind(&new.name)
        .fetch_optional(&mut *executor)
        .await?;
    match inserted {
        Some(created) => {
            info!("created {} entry: {}", T::TABLE, created.name());
            Ok(created)
        }
        None => find_taxon_by_name(&mut *executor, &new.name)
            .await?
            .ok_or(SqlxError::RowNotFound),
    }
}

#[instrument(skip_all)]
pub async fn insert_resource<'a, E: PgExecutor<'a>>(
    executor: E,
    resource: &CreateResource,
    category_id: i32,
) -> Result<ResourceId, SqlxError> {
    sqlx::query_scalar(
        "
            INSERT INTO resources (name, url, category_id, paid, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, current_timestamp) RETURNING id;
        ",
    )
    .bind(&resource.name)
    .bind(&resource.url)
    .bind(category_id)
    .bind(resource.paid)
    .bind(resource.notes.as_deref())
    .fetch_one(executor)
    .await
}

/// Rewrites the language links of a resource, keeping the order of `language_ids`.
#[instrument(skip(executor))]
pub async fn replace_resource_languages(
    executor: &mut PgConnection,
    resource_id: ResourceId,
    language_ids: &[LanguageId],
) -> Result<(), SqlxError> {
    sqlx::query("DELETE FROM resource_languages WHERE resource_id = $1;")
        .bind(resource_id)
        .execute(&mut *executor)
        .await?;
    sqlx::query(
        "
            INSERT INTO resource_languages (resource_id, language_id, position)
            SELECT $1, ids.language_id, ids.position::int
            FROM UNNEST($2::int[]) WITH ORDINALITY AS ids(language_id, position);
        ",
    )
    .bind(resource_id)
    .bind(language_ids)
    .execute(&mut *executor)
    .await?;
    Ok(())
}

#[instrument(skip(executor, update))]
pub async fn update_resource_columns<'a, E: PgExecutor<'a>>(
    executor: E,
    id: ResourceId,
    update: &UpdateResource,
    category_id: Option<i32>,
) -> Result<(), SqlxError> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("UPDATE resources SET last_updated = current_timestamp");
    if let Some(name) = &update.name {
        builder.push(", name = ").push_bind(name.clone());
    }
    if let Some(url) = &update.url {
        builder.push(", url = ").push_bind(url.clone());
    }
    if let Some(category_id) = category_id {
        builder.push(", category_id = ").push_bind(category_id);
    }
    if let Some(paid) = update.paid {
        builder.push(", paid = ").push_bind(paid);
    }
    if let Some(notes) = &update.notes {
        builder.push(", notes = ").push_bind(notes.clone());
    }
    builder.push(" WHERE id = ").push_bind(id);
    builder.build().execute(executor).await?;
    Ok(())
}

/// Single-statement increment. Counters saturate at `i32::MAX`.
#[instrument(skip(executor))]
pub async fn increment_counter<'a, E: PgExecutor<'a>>(
    executor: E,
    id: ResourceId,
    counter: Counter,
) -> Result<Option<ResourceId>, SqlxError> {
    let column = counter.as_ref();
    let query = format!(
        "
            UPDATE resources
            SET {column} = CASE WHEN {column} < {max} THEN {column} + 1 ELSE {column} END
            WHERE id = $1 RETURNING id;
        ",
        max = i32::MAX
    );
    sqlx::query_scalar(&query)
        .bind(id)
        .fetch_optional(executor)
        .await
}

#[instrument(skip(executor, apikey))]
pub async fn insert_api_key<'a, E: PgExecutor<'a>>(
    executor: E,
    email: &str,
    apikey: &str,
) -> Result<Option<ApiKey>, SqlxError> {
    let result: Option<ApiKey> = sqlx::query_as(
        "
            INSERT INTO api_keys (email, apikey, created_at)
            VALUES ($1, $2, current_timestamp)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, apikey, created_at;
        ",
    )
    .bind(email)
    .bind(apikey)
    .fetch_optional(executor)
    .await?;
    if result.is_some() {
        info!("issued api key for: {email}");
    }
    Ok(result)
}
