use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::MembershipConfig;

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("membership service unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
}

/// Checks an email/password pair against the external membership service.
#[async_trait]
pub trait MembershipVerifier: Send + Sync {
    /// `Ok(false)` means the service answered and rejected the credentials.
    async fn verify(&self, email: &str, password: &str) -> Result<bool, MembershipError>;
}

#[derive(Serialize)]
struct SessionUser<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    user: SessionUser<'a>,
}

/// Verifies members by opening a session on the membership service.
pub struct HttpMembershipVerifier {
    client: Client,
    url: String,
}

impl HttpMembershipVerifier {
    pub fn new(config: &MembershipConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to create membership HTTP client")?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl MembershipVerifier for HttpMembershipVerifier {
    #[instrument(skip(self, password))]
    async fn verify(&self, email: &str, password: &str) -> Result<bool, MembershipError> {
        let response = self
            .client
            .post(&self.url)
            .json(&SessionRequest {
                user: SessionUser { email, password },
            })
            .send()
            .await?;
        let status = response.status();
        debug!("membership service answered {status}");
        Ok(status.is_success())
    }
}
