//! Client for the external token-refresh service
//!
//! The connector never runs an OAuth flow itself. A separate service owns
//! the provider handshake and serves refreshed credentials over HTTP;
//! this client fetches them and caches the result.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Error, Result};

/// Credential material returned by the token service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthInfo {
    /// The refreshed access token
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Instance URL the token is valid for, when the provider scopes
    /// tokens to an instance
    #[serde(rename = "instanceURL", default)]
    pub instance_url: Option<String>,
}

/// Fetches access tokens from the credential service and caches them.
///
/// The service does not report token lifetimes, so the cache holds the
/// last fetched token until `refresh()` replaces it. Callers that hit an
/// authorization failure should `refresh()` and retry once.
pub struct TokenRefresher {
    service_url: String,
    provider: String,
    credential_id: String,
    cached: Arc<RwLock<Option<OAuthInfo>>>,
    http_client: Client,
}

impl TokenRefresher {
    /// Create a refresher for one provider credential.
    pub fn new(
        service_url: impl Into<String>,
        provider: impl Into<String>,
        credential_id: impl Into<String>,
    ) -> Self {
        Self::with_client(service_url, provider, credential_id, Client::new())
    }

    /// Create a refresher with a custom HTTP client.
    pub fn with_client(
        service_url: impl Into<String>,
        provider: impl Into<String>,
        credential_id: impl Into<String>,
        http_client: Client,
    ) -> Self {
        Self {
            service_url: service_url.into(),
            provider: provider.into(),
            credential_id: credential_id.into(),
            cached: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Get the current access token, fetching it on first use.
    pub async fn access_token(&self) -> Result<String> {
        {
            let cached = self.cached.read().await;
            if let Some(info) = cached.as_ref() {
                return Ok(info.access_token.clone());
            }
        }

        // Acquire the write lock, then re-check in case another task
        // fetched while we waited.
        let mut cached = self.cached.write().await;
        if let Some(info) = cached.as_ref() {
            return Ok(info.access_token.clone());
        }

        let info = self.fetch().await?;
        let token = info.access_token.clone();
        *cached = Some(info);
        Ok(token)
    }

    /// Force a fetch from the service and replace the cached token.
    pub async fn refresh(&self) -> Result<OAuthInfo> {
        let info = self.fetch().await?;
        let mut cached = self.cached.write().await;
        *cached = Some(info.clone());
        Ok(info)
    }

    /// Fetch the provider's user-facing authorization URL.
    pub async fn auth_url(&self) -> Result<String> {
        let url = format!(
            "{}/v1/oauth/provider/{}/authurl",
            self.service_url.trim_end_matches('/'),
            self.provider
        );
        let response = self.http_client.get(&url).send().await.map_err(Error::Http)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::token_refresh(format!(
                "auth url request failed with status {status}: {body}"
            )));
        }
        response.text().await.map_err(Error::Http)
    }

    async fn fetch(&self) -> Result<OAuthInfo> {
        let url = format!(
            "{}/v1/oauth/provider/{}/credential/{}",
            self.service_url.trim_end_matches('/'),
            self.provider,
            self.credential_id
        );
        debug!(provider = %self.provider, "fetching access token from credential service");

        let response = self.http_client.get(&url).send().await.map_err(Error::Http)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::token_refresh(format!(
                "token request failed with status {status}: {body}"
            )));
        }

        response.json::<OAuthInfo>().await.map_err(Error::Http)
    }
}
