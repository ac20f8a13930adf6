//! # exporter
//!
//! Exports OpenTelemetry traces to Uptrace.
//!
//! The pipeline has three stages:
//! - [`projection`] walks the OTLP hierarchy (resource -> scope -> span) and
//!   yields one flat [`OutputSpan`] per span
//! - [`batcher`] groups the projected spans into batches of a bounded size
//! - [`sender`] ships each batch to the backend; failures are logged and the
//!   export moves on
//!
//! ## Example
//!
//! ```no_run
//! use config::ExporterConfig;
//! use exporter::TraceExporter;
//! use otlp::TracesData;
//!
//! # async fn run(traces: TracesData) -> exporter::Result<()> {
//! let config = ExporterConfig {
//!     dsn: "https://token@api.uptrace.dev/1".to_string(),
//!     ..Default::default()
//! };
//!
//! let exporter = TraceExporter::new(&config)?;
//! exporter.push(&traces).await?;
//! exporter.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod batcher;
pub mod dsn;
pub mod error;
pub mod exporter;
pub mod model;
pub mod projection;
pub mod sender;

pub use attributes::flatten_attributes;
pub use batcher::Batcher;
pub use dsn::{Dsn, DsnError};
pub use error::{ExporterError, Result, SendError};
pub use exporter::TraceExporter;
pub use model::{KeyValue, OutputEvent, OutputLink, OutputSpan, SpanKind, StatusCode, Tracer, Value};
pub use projection::{project, Projection};
pub use sender::{encode_payload, HttpSender, SpanSender};
