//! Translation of listing/search query parameters into filters.
//!
//! The same [`ResourceFilters`] feeds two consumers: SQL predicates appended
//! to the resource listing query, and the boolean filter expression sent to
//! the search index.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::error::ValidationError;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m-%d-%Y", "%m/%d/%Y"];

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub languages: Vec<String>,
    pub category: Option<String>,
    pub updated_after: Option<String>,
    pub paid: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceFilters {
    pub languages: Vec<String>,
    pub category: Option<String>,
    pub updated_after: Option<DateTime<Utc>>,
    pub paid: Option<bool>,
}

impl ResourceFilters {
    pub fn from_query(query: &FilterQuery, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let languages = query
            .languages
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        let category = query
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let updated_after = query
            .updated_after
            .as_deref()
            .map(|raw| parse_updated_after(raw, now))
            .transpose()?;
        let paid = query.paid.as_deref().and_then(parse_paid);
        Ok(Self {
            languages,
            category,
            updated_after,
            paid,
        })
    }

    /// Appends `AND ...` predicates over `resources r` joined with `categories c`.
    pub fn push_predicates(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if !self.languages.is_empty() {
            let lowered: Vec<String> =
                self.languages.iter().map(|l| l.to_lowercase()).collect();
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM resource_languages rl \
                     JOIN languages l ON l.id = rl.language_id \
                     WHERE rl.resource_id = r.id AND lower(l.name) = ANY(",
                )
                .push_bind(lowered)
                .push("))");
        }
        if let Some(category) = &self.category {
            builder
                .push(" AND lower(c.name) = lower(")
                .push_bind(category.clone())
                .push(")");
        }
        if let Some(bound) = self.updated_after {
            builder
                .push(" AND (r.created_at >= ")
                .push_bind(bound)
                .push(" OR r.last_updated >= ")
                .push_bind(bound)
                .push(")");
        }
        if let Some(paid) = self.paid {
            builder.push(" AND r.paid = ").push_bind(paid);
        }
    }

    /// Index filter expression, e.g. `paid=0 AND category:Tools AND (languages:Rust OR languages:C)`.
    pub fn search_expression(&self) -> String {
        let mut clauses = Vec::new();
        if let Some(paid) = self.paid {
            clauses.push(format!("paid={}", u8::from(paid)));
        }
        if let Some(category) = &self.category {
            clauses.push(format!("category:{}", filter_value(category)));
        }
        if !self.languages.is_empty() {
            let languages: Vec<String> = self
                .languages
                .iter()
                .map(|l| format!("languages:{}", filter_value(l)))
                .collect();
            clauses.push(format!("({})", languages.join(" OR ")));
        }
        clauses.join(" AND ")
    }
}

fn filter_value(value: &str) -> String {
    if value.chars().any(|ch| ch.is_whitespace() || ch == '"') {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// `"true"`/`"false"` in any case; anything else means "no filter".
pub fn parse_paid(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Parses the `updated_after` bound and truncates it to the start of its day.
/// Unparsable and future dates are rejected.
pub fn parse_updated_after(
    raw: &str,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ValidationError> {
    let invalid = || ValidationError::Unprocessable {
        param: "updated_after",
        value: raw.to_string(),
    };
    let trimmed = raw.trim();
    let parsed = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(invalid)?;
    if parsed > now.naive_utc() {
        return Err(invalid());
    }
    Ok(parsed.date().and_time(NaiveTime::MIN).and_utc())
}
