//! One-shot batch reads

use crate::config::SourceConfig;
use crate::endpoints::{EndpointTable, ObjectType};
use crate::error::Result;
use crate::http::ApiClient;
use crate::pagination::PagesCursor;
use crate::types::SourceRecord;
use tracing::debug;

/// Walks every page of an endpoint once and maps items into records.
///
/// Offers both a pull API (`next_record`) for hosts that stream records
/// onward one at a time, and `read_all` for hosts that want the whole
/// result set in memory.
#[derive(Debug)]
pub struct BatchReader<'a> {
    cursor: PagesCursor<'a>,
    object_type: ObjectType,
}

impl<'a> BatchReader<'a> {
    /// Validate the config and fetch the first page.
    pub async fn open(
        client: &'a ApiClient,
        table: &'a EndpointTable,
        config: &'a SourceConfig,
    ) -> Result<BatchReader<'a>> {
        config.validate()?;
        let profile = table.profile(config.object_type)?;
        let cursor = PagesCursor::open(client, profile, config).await?;
        Ok(Self {
            cursor,
            object_type: config.object_type,
        })
    }

    /// Next record, or `None` once the endpoint is exhausted.
    pub async fn next_record(&mut self) -> Result<Option<SourceRecord>> {
        if !self.cursor.has_next().await? {
            return Ok(None);
        }
        Ok(self
            .cursor
            .next()
            .map(|item| SourceRecord::new(self.object_type.display_name(), &item)))
    }

    /// Drain the remaining pages into a single vector.
    pub async fn read_all(&mut self) -> Result<Vec<SourceRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record().await? {
            records.push(record);
        }
        debug!(
            object_type = %self.object_type,
            records = records.len(),
            "batch read complete"
        );
        Ok(records)
    }
}
