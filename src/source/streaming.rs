//! Long-lived streaming poll loop

use crate::config::StreamingSourceConfig;
use crate::endpoints::EndpointTable;
use crate::error::Result;
use crate::http::ApiClient;
use crate::pagination::{PageCheckpoint, PagesCursor};
use crate::types::SourceRecord;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Destination for records produced by the streaming poller.
#[async_trait]
pub trait RecordSink: Send {
    /// Deliver one record.
    async fn record(&mut self, record: SourceRecord) -> Result<()>;

    /// Observe a resume point after a page transition.
    ///
    /// Hosts that persist checkpoints can restart a poller from the last
    /// one seen here. The default implementation discards it.
    async fn checkpoint(&mut self, checkpoint: PageCheckpoint) -> Result<()> {
        let _ = checkpoint;
        Ok(())
    }
}

/// Cooperative stop flag for a running poller.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the poll loop wind down.
    ///
    /// The loop notices the flag before emitting a record and after waking
    /// from an idle wait, so it stops within one record or one poll
    /// interval of the call.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// Polls one endpoint indefinitely, feeding records into a [`RecordSink`].
///
/// The loop alternates between draining the cursor and sleeping for the
/// poll interval. On waking it re-fetches the page it stopped on and
/// fast-forwards past the already-delivered items, so a page that grew in
/// the meantime yields only its new trailing items.
pub struct StreamingPoller {
    client: ApiClient,
    table: EndpointTable,
    config: StreamingSourceConfig,
    poll_interval: Duration,
    watermark: Arc<AtomicU64>,
    stop: StopHandle,
}

impl StreamingPoller {
    /// Validate the config and prepare a poller.
    pub fn new(client: ApiClient, config: StreamingSourceConfig) -> Result<Self> {
        config.validate()?;
        let poll_interval = config.poll_interval();
        Ok(Self {
            client,
            table: EndpointTable::new(),
            config,
            poll_interval,
            watermark: Arc::new(AtomicU64::new(0)),
            stop: StopHandle::new(),
        })
    }

    /// Override the poll interval derived from the config.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Handle for requesting the loop to stop.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Highest numeric page offset observed so far.
    ///
    /// Updated with relaxed ordering from inside the poll task, so readers
    /// get an eventually-consistent view. Offsets that do not parse as
    /// unsigned integers leave the value untouched.
    pub fn watermark(&self) -> Arc<AtomicU64> {
        self.watermark.clone()
    }

    /// Run the poll loop on a dedicated task.
    ///
    /// Any fetch or sink error ends the task and comes back through the
    /// handle; the loop never retries beyond the HTTP layer's own policy.
    pub fn spawn<S>(self, sink: S) -> JoinHandle<Result<()>>
    where
        S: RecordSink + 'static,
    {
        tokio::spawn(async move { self.run(sink).await })
    }

    async fn run<S: RecordSink>(self, mut sink: S) -> Result<()> {
        let object_type = self.config.source.object_type;
        info!(
            object_type = %object_type,
            interval = ?self.poll_interval,
            "streaming poller started"
        );
        let result = self.poll_loop(&mut sink).await;
        match &result {
            Ok(()) => info!(object_type = %object_type, "streaming poller stopped"),
            Err(err) => {
                error!(object_type = %object_type, error = %err, "streaming poller failed");
            }
        }
        result
    }

    async fn poll_loop<S: RecordSink>(&self, sink: &mut S) -> Result<()> {
        let config = &self.config.source;
        let profile = self.table.profile(config.object_type)?;
        let display_name = config.object_type.display_name();

        let mut cursor = PagesCursor::open(&self.client, profile, config).await?;
        let mut current_page = cursor.checkpoint().page_offset;
        self.record_offset(cursor.continuation_offset());

        loop {
            // Drain whatever the cursor can currently see.
            while cursor.has_next().await? {
                if self.stop.is_stopped() {
                    return Ok(());
                }
                let fetched_at = cursor.checkpoint().page_offset;
                if fetched_at != current_page {
                    // Crossed into a new page.
                    current_page = fetched_at;
                    self.record_offset(cursor.continuation_offset());
                    sink.checkpoint(cursor.checkpoint()).await?;
                }
                if let Some(item) = cursor.next() {
                    sink.record(SourceRecord::new(display_name, &item)).await?;
                }
            }

            // Idle until the next poll, then pick the last page back up.
            tokio::time::sleep(self.poll_interval).await;
            if self.stop.is_stopped() {
                return Ok(());
            }
            let resume_from = cursor.checkpoint();
            debug!(object_type = %display_name, checkpoint = ?resume_from, "re-polling");
            cursor = PagesCursor::resume(&self.client, profile, config, &resume_from).await?;
        }
    }

    fn record_offset(&self, offset: Option<&str>) {
        if let Some(value) = offset.and_then(|text| text.parse::<u64>().ok()) {
            self.watermark.fetch_max(value, Ordering::Relaxed);
        }
    }
}
