use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{RequestError, ValidationError};

/// JSON request body that must be present and non-empty.
///
/// An empty body, `null` and `{}` all count as missing.
pub struct JsonBody<T>(pub T);

fn malformed(e: impl ToString) -> ValidationError {
    ValidationError::MalformedBody {
        reason: e.to_string(),
    }
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = RequestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| malformed(e.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::MissingBody.into());
        }
        let value: Value = serde_json::from_slice(&bytes).map_err(malformed)?;
        if is_missing(&value) {
            return Err(ValidationError::MissingBody.into());
        }
        let body = serde_json::from_value(value).map_err(malformed)?;
        Ok(JsonBody(body))
    }
}

/// Integer id from the path. Anything else cannot name a row, so it is "not found".
pub struct IdPath(pub i32);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for IdPath {
    type Rejection = RequestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i32>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                debug!("unusable id in path: {e}");
                RequestError::NotFound
            })?;
        Ok(IdPath(id))
    }
}

/// Query string parameters; repeated keys collect into `Vec` fields.
pub struct ParamQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ParamQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = RequestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum_extra::extract::Query(params) =
            axum_extra::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(|e| ValidationError::Unprocessable {
                    param: "query",
                    value: e.to_string(),
                })?;
        Ok(ParamQuery(params))
    }
}
