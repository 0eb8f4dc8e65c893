//! API client with retry and rate limiting
//!
//! One executor serves both sides of the connector: page reads and
//! record writes go through the same credential application, status
//! classification, and retry loop, differing only in retry policy.

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response};
use tracing::{debug, warn};

use super::rate_limit::DailyRateLimiter;
use crate::auth::Credential;
use crate::error::{Error, Result};

/// Retry behavior for transient failures.
///
/// A failure is transient when the request could not complete (transport
/// error) or the server answered outside the 2xx/4xx ranges. 403 and
/// other 4xx responses never retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Up to `max_attempts` total attempts, back to back with no delay.
    Attempts { max_attempts: u32 },
    /// Delays double after every failed attempt, starting at
    /// `initial_delay`, until the elapsed wall clock would exceed
    /// `budget`.
    Backoff {
        initial_delay: Duration,
        budget: Duration,
    },
}

impl RetryPolicy {
    /// Read-path default: three attempts, no delay between them.
    pub fn read() -> Self {
        RetryPolicy::Attempts { max_attempts: 3 }
    }

    /// Write-path default: delays start at one second and double under a
    /// ten second budget.
    pub fn write() -> Self {
        RetryPolicy::Backoff {
            initial_delay: Duration::from_secs(1),
            budget: Duration::from_secs(10),
        }
    }

    /// Delay before the next attempt, or `None` when the policy is
    /// exhausted. `failed_attempts` counts attempts already made;
    /// `elapsed` is wall time since the first attempt started.
    pub(crate) fn next_delay(&self, failed_attempts: u32, elapsed: Duration) -> Option<Duration> {
        match self {
            RetryPolicy::Attempts { max_attempts } => {
                if failed_attempts < *max_attempts {
                    Some(Duration::ZERO)
                } else {
                    None
                }
            }
            RetryPolicy::Backoff {
                initial_delay,
                budget,
            } => {
                let factor = 2u32.saturating_pow(failed_attempts.saturating_sub(1));
                let delay = *initial_delay * factor;
                if elapsed + delay > *budget {
                    None
                } else {
                    Some(delay)
                }
            }
        }
    }
}

/// What one failed attempt looked like, kept for the final error.
struct AttemptFailure {
    status: Option<u16>,
    message: String,
}

/// HTTP client bound to one API server and credential.
pub struct ApiClient {
    client: Client,
    base_url: String,
    credential: Credential,
    rate_limiter: Option<DailyRateLimiter>,
}

impl ApiClient {
    /// Create a builder.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// The API server URL requests are made against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request under the read retry policy.
    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Response> {
        self.get_with_policy(path, query, RetryPolicy::read()).await
    }

    /// Make a GET request under an explicit retry policy.
    pub async fn get_with_policy(
        &self,
        path: &str,
        query: &[(String, String)],
        policy: RetryPolicy,
    ) -> Result<Response> {
        self.execute(Method::GET, path, query, None, policy).await
    }

    /// POST a pre-serialized JSON body under the write retry policy.
    pub async fn post_json(&self, path: &str, body: &str) -> Result<Response> {
        self.post_json_with_policy(path, body, RetryPolicy::write())
            .await
    }

    /// POST a pre-serialized JSON body under an explicit retry policy.
    pub async fn post_json_with_policy(
        &self,
        path: &str,
        body: &str,
        policy: RetryPolicy,
    ) -> Result<Response> {
        self.execute(Method::POST, path, &[], Some(body), policy)
            .await
    }

    /// Shared request loop: sign, send, classify, retry.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&str>,
        policy: RetryPolicy,
    ) -> Result<Response> {
        let url = self.build_url(path);
        let started = Instant::now();
        let mut failed_attempts: u32 = 0;

        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            // Credential goes on first so an API key lands ahead of the
            // paging parameters, matching the URLs the API documents.
            let mut req = self.credential.apply(self.client.request(method.clone(), &url));
            if !query.is_empty() {
                req = req.query(query);
            }
            if let Some(body) = body {
                req = req
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.to_string());
            }

            let failure = match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!(status = status.as_u16(), %url, "request succeeded");
                        return Ok(response);
                    }

                    let status = status.as_u16();
                    let body = response.text().await.unwrap_or_default();
                    if status == 403 {
                        return Err(Error::authorization(status, body));
                    }
                    if (400..500).contains(&status) {
                        return Err(Error::client(status, body));
                    }
                    AttemptFailure {
                        status: Some(status),
                        message: format!("HTTP {status}: {body}"),
                    }
                }
                Err(e) => AttemptFailure {
                    status: None,
                    message: e.to_string(),
                },
            };

            failed_attempts += 1;
            match policy.next_delay(failed_attempts, started.elapsed()) {
                Some(delay) => {
                    warn!(
                        attempt = failed_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure.message,
                        "transient failure, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                None => {
                    return Err(Error::request_failed(
                        failed_attempts,
                        failure.status,
                        failure.message,
                    ));
                }
            }
        }
    }

    /// Build full URL from path
    pub(crate) fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for `ApiClient`
pub struct ApiClientBuilder {
    base_url: String,
    credential: Option<Credential>,
    calls_per_day: Option<u32>,
    timeout: Duration,
    user_agent: String,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::config::DEFAULT_API_SERVER_URL.to_string(),
            credential: None,
            calls_per_day: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("hubspot-connector/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiClientBuilder {
    /// Set the API server URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the credential (required)
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Cap requests to a daily quota; `None` or zero disables the cap
    pub fn calls_per_day(mut self, calls_per_day: Option<u32>) -> Self {
        self.calls_per_day = calls_per_day.filter(|c| *c > 0);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ApiClient> {
        let credential = self
            .credential
            .ok_or_else(|| Error::missing_field("credential"))?;
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(Error::Http)?;
        let rate_limiter = self.calls_per_day.map(DailyRateLimiter::new);

        Ok(ApiClient {
            client,
            base_url: self.base_url,
            credential,
            rate_limiter,
        })
    }
}
