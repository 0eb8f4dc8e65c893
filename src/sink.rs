//! Write-side record submission
//!
//! `RecordSubmitter` posts one object body per call to the write endpoint
//! of the configured object type. Server errors are retried under the write
//! retry policy; when the budget runs out the last status comes back in the
//! error. One record, one outcome.

use crate::config::SinkConfig;
use crate::endpoints::EndpointTable;
use crate::error::{Error, Result};
use crate::http::{ApiClient, RetryPolicy};
use crate::types::JsonValue;
use tracing::debug;

/// Submits object bodies to an endpoint's write path.
#[derive(Debug)]
pub struct RecordSubmitter {
    client: ApiClient,
    config: SinkConfig,
    write_path: &'static str,
    policy: RetryPolicy,
}

impl RecordSubmitter {
    /// Validate the config and resolve the write endpoint.
    ///
    /// Object types without a write endpoint are rejected here, before any
    /// record is accepted.
    pub fn new(client: ApiClient, table: &EndpointTable, config: SinkConfig) -> Result<Self> {
        config.validate(table)?;
        let profile = table.profile(config.object_type)?;
        let write_path = profile.write_path.ok_or_else(|| {
            Error::config(format!(
                "object type '{}' does not support writes",
                config.object_type
            ))
        })?;
        Ok(Self {
            client,
            config,
            write_path,
            policy: RetryPolicy::write(),
        })
    }

    /// Override the write retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// POST one raw JSON body to the write endpoint.
    pub async fn submit(&self, object_json: &str) -> Result<()> {
        self.client
            .post_json_with_policy(self.write_path, object_json, self.policy)
            .await?;
        debug!(
            object_type = %self.config.object_type,
            path = self.write_path,
            "record submitted"
        );
        Ok(())
    }

    /// Pull the configured object field out of a record and submit it.
    ///
    /// String values are posted as-is; anything else is serialized first.
    pub async fn submit_record(&self, record: &JsonValue) -> Result<()> {
        let object = record.get(&self.config.object_field).ok_or_else(|| {
            Error::config(format!(
                "input record has no field '{}'",
                self.config.object_field
            ))
        })?;
        let body = match object {
            JsonValue::String(text) => text.clone(),
            other => other.to_string(),
        };
        self.submit(&body).await
    }
}
