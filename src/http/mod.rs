//! HTTP client module
//!
//! Provides the API client with credential signing, retry, and rate
//! limiting.
//!
//! # Features
//!
//! - **Status Classification**: 2xx success, 403 authorization failure,
//!   other 4xx client error, everything else retried
//! - **Retry Policies**: fixed back-to-back attempts for reads, doubling
//!   delays under a wall-clock budget for writes
//! - **Rate Limiting**: daily call quota using governor

mod client;
mod rate_limit;

pub use client::{ApiClient, ApiClientBuilder, RetryPolicy};
pub use rate_limit::DailyRateLimiter;
