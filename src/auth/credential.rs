//! Credential resolution and request signing

use reqwest::RequestBuilder;

use crate::error::{Error, Result};
use crate::types::OptionStringExt;

/// Query parameter carrying a legacy API key
const API_KEY_PARAM: &str = "hapikey";

/// A resolved HubSpot credential.
///
/// Access tokens are sent as a bearer `Authorization` header; API keys
/// ride along as the `hapikey` query parameter. When a config carries
/// both, the access token wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// OAuth private app access token
    AccessToken(String),
    /// Legacy developer API key
    ApiKey(String),
}

impl Credential {
    /// Resolve a credential from optional config fields, applying the
    /// access-token-over-api-key precedence. Empty strings count as
    /// absent.
    pub fn from_parts(access_token: Option<String>, api_key: Option<String>) -> Result<Self> {
        if let Some(token) = access_token.none_if_empty() {
            return Ok(Credential::AccessToken(token));
        }
        if let Some(key) = api_key.none_if_empty() {
            return Ok(Credential::ApiKey(key));
        }
        Err(Error::missing_field("apiKey"))
    }

    /// Apply the credential to a request builder.
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match self {
            Credential::AccessToken(token) => req.bearer_auth(token),
            Credential::ApiKey(key) => req.query(&[(API_KEY_PARAM, key.as_str())]),
        }
    }
}
