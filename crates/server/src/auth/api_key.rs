use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

use crate::error::RequestError;
use crate::models::api_key::ApiKey;
use crate::server::constants::API_KEY_HEADER;
use crate::server::state::AppState;

/// Caller identified by a valid `x-apikey` header.
#[derive(Debug)]
pub struct Authenticated {
    pub key: ApiKey,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = RequestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let apikey = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                debug!("request without usable {API_KEY_HEADER} header");
                RequestError::BadCredentials
            })?;
        let key = state
            .db_connection
            .find_api_key(apikey)
            .await?
            .ok_or_else(|| {
                debug!("request with unknown api key");
                RequestError::BadCredentials
            })?;
        Ok(Authenticated { key })
    }
}
