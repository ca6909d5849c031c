use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ApiKeyId = i32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ApiKey {
    #[serde(skip)]
    pub id: ApiKeyId,
    pub email: String,
    pub apikey: String,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ApiKeyRequest {
    pub email: String,
    pub password: String,
}
