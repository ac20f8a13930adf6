//! # otlp
//!
//! OpenTelemetry Protocol (OTLP) trace types used as the input of the exporter.
//!
//! The message types come from the `opentelemetry-proto` crate (trace, common
//! and resource packages) and are re-exported here. On top of them this crate
//! provides:
//! - decoding a `TracesData` payload from protobuf bytes or a file
//! - small constructors for attribute key-values ([`KeyValueExt`])
//! - span counting over the resource → scope → span hierarchy ([`TracesDataExt`])
//!
//! ## Example
//!
//! ```
//! use otlp::{KeyValue, KeyValueExt, ResourceSpans, ScopeSpans, Span, TracesData, TracesDataExt};
//!
//! let traces = TracesData {
//!     resource_spans: vec![ResourceSpans {
//!         scope_spans: vec![ScopeSpans {
//!             spans: vec![Span {
//!                 name: "GET /".to_string(),
//!                 attributes: vec![KeyValue::string("http.method", "GET")],
//!                 ..Default::default()
//!             }],
//!             ..Default::default()
//!         }],
//!         ..Default::default()
//!     }],
//! };
//!
//! let bytes = otlp::encode_traces(&traces);
//! let decoded = otlp::decode_traces(bytes.as_slice()).unwrap();
//! assert_eq!(decoded.span_count(), 1);
//! ```

pub use opentelemetry_proto::tonic::{common, resource, trace};

pub mod convert;
pub mod error;

pub use convert::{decode_traces, encode_traces, read_traces_file, KeyValueExt, TracesDataExt};
pub use error::{OtlpError, Result};

// Re-export commonly used types for convenience
pub use common::v1::{any_value, AnyValue, InstrumentationScope, KeyValue};
pub use resource::v1::Resource;
pub use trace::v1::{span, status, ResourceSpans, ScopeSpans, Span, Status, TracesData};
