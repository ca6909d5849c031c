use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::pagination::{Page, PaginationDetails};
use crate::server::constants::API_VERSION;

/// Successful response body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    status: &'static str,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination_details: Option<PaginationDetails>,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            api_version: API_VERSION,
            status: "ok",
            data,
            pagination_details: None,
        }
    }
}

impl<T: Serialize> Envelope<Vec<T>> {
    pub fn page(page: Page<T>) -> Self {
        Self {
            api_version: API_VERSION,
            status: "ok",
            data: page.items,
            pagination_details: Some(page.details),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorEntry {
    status: u16,
    code: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    #[serde(skip)]
    http_status: StatusCode,
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    status: String,
    errors: Vec<ErrorEntry>,
}

impl ErrorEnvelope {
    pub fn new(http_status: StatusCode, code: &'static str, message: String) -> Self {
        let status = http_status
            .canonical_reason()
            .unwrap_or("error")
            .to_lowercase();
        Self {
            http_status,
            api_version: API_VERSION,
            status,
            errors: vec![ErrorEntry {
                status: http_status.as_u16(),
                code,
                message,
            }],
        }
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}
