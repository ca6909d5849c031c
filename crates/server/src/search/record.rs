use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::models::resource::{Resource, ResourceId, UpdateResource};

/// Full index projection of a [`Resource`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndexRecord {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paid: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Index records are schemaless, attributes may come back as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<&Resource> for SearchIndexRecord {
    fn from(resource: &Resource) -> Self {
        Self {
            object_id: resource.id.to_string(),
            name: resource.name.clone(),
            url: resource.url.clone(),
            category: resource.category.clone(),
            languages: resource.languages.clone(),
            paid: resource.paid,
            notes: resource.notes.clone(),
        }
    }
}

/// Attribute-level index update. Only the attributes the client changed are
/// serialized; `notes: Some(None)` is sent as an explicit `null`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartialIndexRecord {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl PartialIndexRecord {
    /// Takes values from the committed `resource` so resolved tag names keep
    /// their stored spelling.
    pub fn from_update(resource: &Resource, update: &UpdateResource) -> Self {
        Self {
            object_id: resource.id.to_string(),
            name: update.name.as_ref().map(|_| resource.name.clone()),
            url: update.url.as_ref().map(|_| resource.url.clone()),
            category: update.category.as_ref().map(|_| resource.category.clone()),
            languages: update.languages.as_ref().map(|_| resource.languages.clone()),
            paid: update.paid.map(|_| resource.paid),
            notes: update.notes.as_ref().map(|_| resource.notes.clone()),
        }
    }
}

/// A search result as returned to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: ResourceId,
    pub name: String,
    pub url: String,
    pub category: String,
    pub languages: Vec<String>,
    pub paid: bool,
    pub notes: Option<String>,
}

impl SearchHit {
    /// Hits whose object id is not a resource id are dropped.
    pub fn from_record(record: SearchIndexRecord) -> Option<Self> {
        let Ok(id) = record.object_id.parse() else {
            warn!("skipping search hit with foreign object id: {}", record.object_id);
            return None;
        };
        Some(Self {
            id,
            name: record.name,
            url: record.url,
            category: record.category,
            languages: record.languages,
            paid: record.paid,
            notes: record.notes,
        })
    }
}
