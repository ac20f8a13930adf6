//! Transmission of span batches
//!
//! [`SpanSender`] is the seam between the exporter and the backend. The
//! exporter only needs `send` and `shutdown`; how a batch is encoded and
//! transported is up to the implementation.
//!
//! [`HttpSender`] posts each batch as gzip-compressed JSON
//! (`{"spans": [...]}`) to the spans endpoint of an Uptrace DSN.

use crate::dsn::Dsn;
use crate::error::SendError;
use crate::model::OutputSpan;
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Sends span batches to a backend.
///
/// Implementations must be safe to share between concurrent pushes.
#[async_trait]
pub trait SpanSender: Send + Sync {
    /// Sends one batch
    async fn send(&self, spans: &[OutputSpan]) -> Result<(), SendError>;

    /// Releases resources held by the sender. Must be idempotent.
    async fn shutdown(&self) -> Result<(), SendError> {
        Ok(())
    }

    /// Returns the sender name for logging
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: SpanSender + ?Sized> SpanSender for Arc<T> {
    async fn send(&self, spans: &[OutputSpan]) -> Result<(), SendError> {
        (**self).send(spans).await
    }

    async fn shutdown(&self) -> Result<(), SendError> {
        (**self).shutdown().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: SpanSender + ?Sized> SpanSender for Box<T> {
    async fn send(&self, spans: &[OutputSpan]) -> Result<(), SendError> {
        (**self).send(spans).await
    }

    async fn shutdown(&self) -> Result<(), SendError> {
        (**self).shutdown().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Stands in for a response body that could not be read
const UNREADABLE_BODY: &str = "<unreadable body>";

#[derive(Serialize)]
struct Payload<'a> {
    spans: &'a [OutputSpan],
}

/// Serializes a batch as `{"spans": [...]}` JSON and gzip-compresses it
pub fn encode_payload(spans: &[OutputSpan]) -> Result<Vec<u8>, SendError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    serde_json::to_writer(&mut encoder, &Payload { spans })?;
    encoder.flush()?;
    Ok(encoder.finish()?)
}

/// HTTP sender for the Uptrace spans endpoint
#[derive(Debug)]
pub struct HttpSender {
    client: reqwest::Client,
    dsn: Dsn,
    endpoint: String,
    closed: AtomicBool,
}

impl HttpSender {
    /// Creates a sender with a pooled client; `timeout` bounds each request
    pub fn new(dsn: Dsn, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let endpoint = dsn.spans_endpoint();

        info!(endpoint = %endpoint, project_id = dsn.project_id(), "Created HTTP span sender");

        Ok(Self {
            client,
            dsn,
            endpoint,
            closed: AtomicBool::new(false),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn dsn(&self) -> &Dsn {
        &self.dsn
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl SpanSender for HttpSender {
    async fn send(&self, spans: &[OutputSpan]) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError::Closed);
        }

        let body = encode_payload(spans)?;
        debug!(
            spans = spans.len(),
            bytes = body.len(),
            endpoint = %self.endpoint,
            "Posting span batch"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_ENCODING, "gzip")
            .bearer_auth(self.dsn.token())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| UNREADABLE_BODY.to_string());
            return Err(SendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    async fn shutdown(&self) -> Result<(), SendError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(endpoint = %self.endpoint, "HTTP span sender shut down");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
