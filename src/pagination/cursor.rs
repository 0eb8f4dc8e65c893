//! Flattening iteration over the page sequence

use serde::{Deserialize, Serialize};

use super::page::{fetch_page, Page};
use crate::config::SourceConfig;
use crate::endpoints::EndpointProfile;
use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::types::JsonValue;

/// Snapshot of cursor position sufficient to resume emission without
/// re-emitting already-delivered items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCheckpoint {
    /// Offset the current page was fetched at (`None` for the first page).
    pub page_offset: Option<String>,

    /// Items already consumed from that page.
    pub index_in_page: usize,
}

/// Iterator over every item of every page of one endpoint.
///
/// `has_next()` fetches pages as needed; `next()` only hands out what the
/// last `has_next()` confirmed. The cursor is single-owner and mutated
/// only through these two calls.
#[derive(Debug)]
pub struct PagesCursor<'a> {
    client: &'a ApiClient,
    profile: &'a EndpointProfile,
    config: &'a SourceConfig,
    page: Page,
    /// Offset `page` was fetched at, kept for checkpoints.
    page_offset: Option<String>,
    index_in_page: usize,
}

impl<'a> PagesCursor<'a> {
    /// Fetch the first page and position at its first item.
    pub async fn open(
        client: &'a ApiClient,
        profile: &'a EndpointProfile,
        config: &'a SourceConfig,
    ) -> Result<PagesCursor<'a>> {
        let page = fetch_page(client, profile, config, None).await?;
        check_protocol(profile, &page)?;
        Ok(PagesCursor {
            client,
            profile,
            config,
            page,
            page_offset: None,
            index_in_page: 0,
        })
    }

    /// Re-fetch the checkpointed page and fast-forward past the items the
    /// checkpoint says were already consumed, without emitting them.
    pub async fn resume(
        client: &'a ApiClient,
        profile: &'a EndpointProfile,
        config: &'a SourceConfig,
        checkpoint: &PageCheckpoint,
    ) -> Result<PagesCursor<'a>> {
        let page = fetch_page(client, profile, config, checkpoint.page_offset.as_deref()).await?;
        check_protocol(profile, &page)?;
        Ok(PagesCursor {
            client,
            profile,
            config,
            page,
            page_offset: checkpoint.page_offset.clone(),
            index_in_page: checkpoint.index_in_page,
        })
    }

    /// Whether another item is available, fetching the next page when the
    /// current one is exhausted and the API said more data follows.
    pub async fn has_next(&mut self) -> Result<bool> {
        loop {
            if self.index_in_page < self.page.items.len() {
                return Ok(true);
            }
            if self.page.has_more != Some(true) {
                return Ok(false);
            }
            // advance errors on a page that cannot make progress, so this
            // loop terminates.
            self.advance().await?;
        }
    }

    /// The item `has_next()` confirmed, or `None` when the current page is
    /// exhausted.
    pub fn next(&mut self) -> Option<JsonValue> {
        let item = self.page.items.get(self.index_in_page).cloned()?;
        self.index_in_page += 1;
        Some(item)
    }

    /// Position snapshot for the streaming poller.
    pub fn checkpoint(&self) -> PageCheckpoint {
        PageCheckpoint {
            page_offset: self.page_offset.clone(),
            index_in_page: self.index_in_page,
        }
    }

    /// Continuation offset reported by the current page.
    pub fn continuation_offset(&self) -> Option<&str> {
        self.page.offset.as_deref()
    }

    async fn advance(&mut self) -> Result<()> {
        let next_offset = self.page.offset.clone();
        if next_offset.is_none() && self.profile.offset_param.is_some() {
            return Err(Error::malformed(
                self.profile.offset_field.unwrap_or("offset"),
                "page reports more data but no continuation offset",
            ));
        }

        let page = fetch_page(self.client, self.profile, self.config, next_offset.as_deref()).await?;
        check_protocol(self.profile, &page)?;

        self.page = page;
        self.page_offset = next_offset;
        self.index_in_page = 0;
        Ok(())
    }
}

/// A page claiming more data while containing no items can never make
/// progress.
fn check_protocol(profile: &EndpointProfile, page: &Page) -> Result<()> {
    if page.items.is_empty() && page.has_more == Some(true) {
        return Err(Error::malformed(
            profile.more_field.unwrap_or("hasMore"),
            "page reports more data but contains no items",
        ));
    }
    Ok(())
}
