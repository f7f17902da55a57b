//! Client-credentials token acquisition against the identity provider.

use crate::{app::config::Credentials, error::RelayError};
use reqwest::Client as ReqwestClient;
use serde::Deserialize;

/// An app access token. Only ever used as a bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Fetches a fresh app access token on every call. Nothing is cached.
#[derive(Clone)]
pub struct AuthClient {
    reqwest_client: ReqwestClient,
    token_url: String,
    credentials: Credentials,
}

impl AuthClient {
    pub fn new(reqwest_client: ReqwestClient, token_url: String, credentials: Credentials) -> Self {
        Self {
            reqwest_client,
            token_url,
            credentials,
        }
    }

    /// POSTs the client credentials grant and returns `access_token`.
    pub async fn fetch_access_token(&self) -> Result<AccessToken, RelayError> {
        tracing::debug!("Requesting app access token from {}", self.token_url);

        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .reqwest_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Token endpoint returned {}", status);
            return Err(RelayError::UpstreamAuth { status });
        }

        let body = response.text().await?;
        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| RelayError::Parse(format!("token response: {}", e)))?;

        Ok(AccessToken::new(token.access_token))
    }
}
