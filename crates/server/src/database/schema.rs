use sqlx::{Error as SqlxError, Postgres, Transaction};
use tracing::{info, instrument};

use crate::database::connection::DbConnection;

impl DbConnection {
    /// Creates every table that does not exist yet.
    pub async fn init_schema(&self) -> Result<(), SqlxError> {
        let mut transaction = self.pool().begin().await?;
        create_all_tables(&mut transaction).await?;
        transaction.commit().await?;
        info!("database schema is ready");
        Ok(())
    }

    pub async fn drop_schema(&self) -> Result<(), SqlxError> {
        let mut transaction = self.pool().begin().await?;
        drop_all_tables(&mut transaction).await?;
        transaction.commit().await?;
        Ok(())
    }
}

#[instrument(skip_all)]
pub async fn create_all_tables(
    transaction: &mut Transaction<'_, Postgres>,
) -> Result<(), SqlxError> {
    let statements = [
        "
            CREATE TABLE IF NOT EXISTS categories (
                id      int PRIMARY KEY GENERATED ALWAYS AS IDENTITY,
                name    TEXT NOT NULL
            );
        ",
        "CREATE UNIQUE INDEX IF NOT EXISTS categories_name_key ON categories (lower(name));",
        "
            CREATE TABLE IF NOT EXISTS languages (
                id      int PRIMARY KEY GENERATED ALWAYS AS IDENTITY,
                name    TEXT NOT NULL
            );
        ",
        "CREATE UNIQUE INDEX IF NOT EXISTS languages_name_key ON languages (lower(name));",
        "
            CREATE TABLE IF NOT EXISTS resources (
                id              int PRIMARY KEY GENERATED ALWAYS AS IDENTITY,
                name            TEXT NOT NULL,
                url             TEXT NOT NULL UNIQUE,
                category_id     int NOT NULL REFERENCES categories(id),
                paid            BOOLEAN NOT NULL DEFAULT FALSE,
                notes           TEXT,
                upvotes         int NOT NULL DEFAULT 0,
                downvotes       int NOT NULL DEFAULT 0,
                times_clicked   int NOT NULL DEFAULT 0,
                created_at      TIMESTAMP WITH TIME ZONE NOT NULL,
                last_updated    TIMESTAMP WITH TIME ZONE
            );
        ",
        "
            CREATE TABLE IF NOT EXISTS resource_languages (
                resource_id     int NOT NULL REFERENCES resources(id) ON UPDATE CASCADE ON DELETE CASCADE,
                language_id     int NOT NULL REFERENCES languages(id) ON UPDATE CASCADE ON DELETE CASCADE,
                position        int NOT NULL,
                CONSTRAINT resource_language_pkey PRIMARY KEY (resource_id, language_id)
            );
        ",
        "
            CREATE TABLE IF NOT EXISTS api_keys (
                id          int PRIMARY KEY GENERATED ALWAYS AS IDENTITY,
                email       TEXT NOT NULL UNIQUE,
                apikey      TEXT NOT NULL UNIQUE,
                created_at  TIMESTAMP WITH TIME ZONE NOT NULL
            );
        ",
    ];
    for statement in &statements {
        sqlx::query(statement).execute(transaction.as_mut()).await?;
    }
    Ok(())
}

#[instrument(skip_all)]
pub async fn drop_all_tables(transaction: &mut Transaction<'_, Postgres>) -> Result<(), SqlxError> {
    let statements = [
        "DROP TABLE IF EXISTS api_keys;",
        "DROP TABLE IF EXISTS resource_languages;",
        "DROP TABLE IF EXISTS resources;",
        "DROP TABLE IF EXISTS languages;",
        "DROP TABLE IF EXISTS categories;",
    ];
    for statement in &statements {
        sqlx::query(statement).execute(transaction.as_mut()).await?;
    }
    Ok(())
}
