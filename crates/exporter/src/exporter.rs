//! Trace exporter
//!
//! [`TraceExporter::push`] projects a [`TracesData`] into flat spans and sends
//! them in batches of at most `max_batch_size` spans. A batch is sent as soon
//! as it fills up; the remainder is sent after the traversal.
//!
//! Sending is fire-and-log: a failed batch is logged at warn level and the
//! push carries on with the next one. `push` always reports zero dropped
//! spans, so failures are not visible to the caller's flow control.

use crate::batcher::Batcher;
use crate::dsn::Dsn;
use crate::error::{ExporterError, Result};
use crate::model::OutputSpan;
use crate::projection::project;
use crate::sender::{HttpSender, SpanSender};
use config::ExporterConfig;
use otlp::{TracesData, TracesDataExt};
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Exports traces to Uptrace
pub struct TraceExporter<S = HttpSender> {
    max_batch_size: NonZeroUsize,
    sender: S,
}

impl TraceExporter<HttpSender> {
    /// Creates an exporter sending over HTTP to the configured DSN.
    ///
    /// Fails if the batch size is not positive, the DSN is invalid or the
    /// HTTP client can't be built.
    pub fn new(config: &ExporterConfig) -> Result<Self> {
        let max_batch_size = validate_batch_size(config.max_batch_size)?;
        let dsn = Dsn::parse(&config.dsn)?;
        let sender = HttpSender::new(dsn, Duration::from_secs(config.timeout_secs))
            .map_err(ExporterError::Client)?;

        info!(
            max_batch_size = max_batch_size.get(),
            endpoint = sender.endpoint(),
            "Created Uptrace trace exporter"
        );

        Ok(Self {
            max_batch_size,
            sender,
        })
    }
}

impl<S: SpanSender> TraceExporter<S> {
    /// Creates an exporter around an arbitrary sender
    pub fn with_sender(max_batch_size: i64, sender: S) -> Result<Self> {
        Ok(Self {
            max_batch_size: validate_batch_size(max_batch_size)?,
            sender,
        })
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size.get()
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Exports all spans of `traces`; returns the number of dropped spans,
    /// which is always zero.
    pub async fn push(&self, traces: &TracesData) -> Result<usize> {
        let mut batcher = Batcher::new(self.max_batch_size);
        let mut batches = 0usize;
        let mut failed = 0usize;

        for span in project(traces) {
            if let Some(batch) = batcher.push(span) {
                batches += 1;
                if !self.send_spans(&batch).await {
                    failed += 1;
                }
            }
        }

        if let Some(batch) = batcher.finish() {
            batches += 1;
            if !self.send_spans(&batch).await {
                failed += 1;
            }
        }

        debug!(
            spans = traces.span_count(),
            batches,
            failed,
            "Pushed trace data"
        );

        Ok(0)
    }

    /// Sends one batch, logging instead of returning a failure
    async fn send_spans(&self, spans: &[OutputSpan]) -> bool {
        match self.sender.send(spans).await {
            Ok(()) => {
                debug!(spans = spans.len(), sender = self.sender.name(), "Sent span batch");
                true
            }
            Err(e) => {
                warn!(
                    error = %e,
                    spans = spans.len(),
                    sender = self.sender.name(),
                    "Failed to send span batch"
                );
                false
            }
        }
    }

    /// Releases the sender. Safe to call more than once; does not wait for
    /// in-flight pushes.
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .shutdown()
            .await
            .map_err(ExporterError::Shutdown)?;
        info!(sender = self.sender.name(), "Trace exporter shut down");
        Ok(())
    }
}

fn validate_batch_size(max_batch_size: i64) -> Result<NonZeroUsize> {
    usize::try_from(max_batch_size)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or(ExporterError::InvalidBatchSize(max_batch_size))
}
