//! Flat span records sent to the backend
//!
//! These are the projected counterparts of the OTLP hierarchy: every
//! [`OutputSpan`] carries its resource attributes and instrumentation scope
//! inline, so a batch is a plain list with no references back into the input.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A flattened attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    #[serde(flatten)]
    pub value: Value,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    pub fn int64(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::Int64(value))
    }

    pub fn float64(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, Value::Float64(value))
    }
}

/// Attribute value types supported by the backend.
///
/// Serialized as `{"type": "<tag>", "value": <value>}` next to the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    String(String),
    Bool(bool),
    Int64(i64),
    Float64(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    #[default]
    Internal,
    Server,
    Client,
    Producer,
    Consumer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCode {
    #[default]
    Unset,
    Ok,
    Error,
}

/// Instrumentation scope that produced a span
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tracer {
    pub name: String,
    pub version: String,
}

/// A span event projected onto its parent span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEvent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<KeyValue>,
    /// Unix epoch nanoseconds
    pub time: i64,
}

/// A link to another span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputLink {
    #[serde(with = "hex::serde")]
    pub trace_id: [u8; 16],
    pub span_id: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<KeyValue>,
}

/// A span flattened for transmission.
///
/// `resource` is shared by every span projected from the same resource group.
/// `events` and `links` are `None` (and omitted on the wire) when the source
/// span had none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpan {
    pub id: u64,
    pub parent_id: u64,
    #[serde(with = "hex::serde")]
    pub trace_id: [u8; 16],

    pub name: String,
    pub kind: SpanKind,
    /// Unix epoch nanoseconds
    pub start_time: i64,
    /// Unix epoch nanoseconds
    pub end_time: i64,

    pub resource: Arc<[KeyValue]>,
    pub attrs: Vec<KeyValue>,

    pub status_code: StatusCode,
    pub status_message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<OutputEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<OutputLink>>,

    pub tracer: Tracer,
}
