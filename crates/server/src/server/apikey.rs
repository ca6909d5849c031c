use std::sync::Arc;

use axum::extract::State;
use tracing::info;

use crate::auth::utils::generate_api_key;
use crate::database::connection::DbConnection;
use crate::error::RequestError;
use crate::models::api_key::{ApiKey, ApiKeyRequest};
use crate::server::envelope::Envelope;
use crate::server::extract::JsonBody;
use crate::server::state::AppState;

/// Returns the caller's api key, issuing one on first use.
///
/// Only members confirmed by the membership service get a key.
pub async fn issue_api_key(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<ApiKeyRequest>,
) -> Result<Envelope<ApiKey>, RequestError> {
    if !state
        .membership
        .verify(&request.email, &request.password)
        .await?
    {
        info!("membership service rejected: {}", request.email);
        return Err(RequestError::BadCredentials);
    }
    let key = issue_or_reuse(&state.db_connection, &request.email).await?;
    Ok(Envelope::data(key))
}

pub async fn issue_or_reuse(db: &DbConnection, email: &str) -> Result<ApiKey, RequestError> {
    if let Some(existing) = db.find_api_key_by_email(email).await? {
        return Ok(existing);
    }
    if let Some(issued) = db.insert_api_key(email, &generate_api_key()).await? {
        return Ok(issued);
    }
    // lost a race against a concurrent request for the same email
    db.find_api_key_by_email(email)
        .await?
        .ok_or(RequestError::Internal("api key missing after conflicting insert"))
}
