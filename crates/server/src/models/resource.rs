use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::error::ValidationError;

pub type ResourceId = i32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub url: String,
    pub category: String,
    pub languages: Vec<String>,
    pub paid: bool,
    pub notes: Option<String>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub times_clicked: i32,
    pub created_at: DateTime<Utc>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Counter columns bumped by the vote and click endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Counter {
    Upvotes,
    Downvotes,
    TimesClicked,
}

/// `paid` arrives either as a JSON bool or as the strings "true"/"false".
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PaidValue {
    Bool(bool),
    Text(String),
}

impl PaidValue {
    pub fn coerce(&self) -> Result<bool, ValidationError> {
        match self {
            Self::Bool(paid) => Ok(*paid),
            Self::Text(text) => match text.trim().to_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(ValidationError::InvalidInput {
                    value: text.clone(),
                    reason: "paid must be a boolean or \"true\"/\"false\"".to_string(),
                }),
            },
        }
    }
}

/// Raw create/update body. The outer `Option` tells whether a field was sent,
/// the inner one whether it was `null`.
#[derive(Debug, Default, Deserialize)]
pub struct ResourcePayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub languages: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present")]
    pub paid: Option<Option<PaidValue>>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateResource {
    pub name: String,
    pub url: String,
    pub category: String,
    pub languages: Vec<String>,
    pub paid: bool,
    pub notes: Option<String>,
}

/// Field-level changes; `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateResource {
    pub name: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub languages: Option<Vec<String>>,
    pub paid: Option<bool>,
    pub notes: Option<Option<String>>,
}

impl UpdateResource {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.url.is_none() {
            missing.push("url");
        }
        if self.category.is_none() {
            missing.push("category");
        }
        if self.paid.is_none() {
            missing.push("paid");
        }
        missing
    }
}

impl ResourcePayload {
    pub fn into_create(self) -> Result<CreateResource, ValidationError> {
        match self.into_update()? {
            UpdateResource {
                name: Some(name),
                url: Some(url),
                category: Some(category),
                paid: Some(paid),
                languages,
                notes,
            } => Ok(CreateResource {
                name,
                url,
                category,
                languages: languages.unwrap_or_default(),
                paid,
                notes: notes.flatten(),
            }),
            update => Err(ValidationError::MissingFields {
                fields: update.missing_required(),
            }),
        }
    }

    pub fn into_update(self) -> Result<UpdateResource, ValidationError> {
        let paid = match not_null("paid", self.paid)? {
            Some(paid) => Some(paid.coerce()?),
            None => None,
        };
        let languages = match not_null("languages", self.languages)? {
            Some(languages) => Some(language_names(languages)?),
            None => None,
        };
        Ok(UpdateResource {
            name: non_empty_text("name", self.name)?,
            url: non_empty_text("url", self.url)?,
            category: non_empty_text("category", self.category)?,
            languages,
            paid,
            notes: self.notes,
        })
    }
}

fn not_null<T>(field: &str, value: Option<Option<T>>) -> Result<Option<T>, ValidationError> {
    match value {
        Some(None) => Err(ValidationError::InvalidInput {
            value: "null".to_string(),
            reason: format!("{field} cannot be null"),
        }),
        Some(Some(value)) => Ok(Some(value)),
        None => Ok(None),
    }
}

fn non_empty_text(
    field: &str,
    value: Option<Option<String>>,
) -> Result<Option<String>, ValidationError> {
    let Some(text) = not_null(field, value)? else {
        return Ok(None);
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidInput {
            value: text,
            reason: format!("{field} cannot be empty"),
        });
    }
    Ok(Some(trimmed.to_string()))
}

/// Trims names, rejects blank ones and collapses case-insensitive duplicates,
/// keeping the first spelling.
fn language_names(names: Vec<String>) -> Result<Vec<String>, ValidationError> {
    let mut unique: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidInput {
                value: name,
                reason: "language names cannot be empty".to_string(),
            });
        }
        let key = trimmed.to_lowercase();
        if !unique.iter().any(|seen| seen.to_lowercase() == key) {
            unique.push(trimmed.to_string());
        }
    }
    Ok(unique)
}
