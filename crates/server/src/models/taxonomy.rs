use std::fmt::Debug;

use serde::Serialize;
use sqlx::postgres::PgRow;

pub type LanguageId = i32;
pub type CategoryId = i32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Language {
    pub id: LanguageId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A named tag table (`languages`, `categories`) keyed case-insensitively by name.
pub trait Taxon: for<'r> sqlx::FromRow<'r, PgRow> + Serialize + Debug + Send + Unpin {
    const TABLE: &'static str;

    fn name(&self) -> &str;
}

impl Taxon for Language {
    const TABLE: &'static str = "languages";

    fn name(&self) -> &str {
        &self.name
    }
}

impl Taxon for Category {
    const TABLE: &'static str = "categories";

    fn name(&self) -> &str {
        &self.name
    }
}

/// A tag that has been constructed but not written yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTaxon {
    pub name: String,
}

/// Outcome of looking a tag up by name: either the stored row or a new,
/// unsaved value that the write transaction has to insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolved<T> {
    Existing(T),
    New(NewTaxon),
}
