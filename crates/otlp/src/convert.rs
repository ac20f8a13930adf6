//! Conversion utilities for OTLP trace payloads
//!
//! Decoding/encoding of `TracesData` protobuf messages, plus constructors
//! for attribute values so callers don't have to spell out the nested
//! `KeyValue { value: Some(AnyValue { value: Some(..) }) }` shape.

use crate::common::v1::{any_value, AnyValue, KeyValue};
use crate::error::{OtlpError, Result};
use crate::trace::v1::TracesData;
use bytes::Buf;
use prost::Message;
use std::path::Path;

/// Decode a `TracesData` message from protobuf bytes
pub fn decode_traces(buf: impl Buf) -> Result<TracesData> {
    Ok(TracesData::decode(buf)?)
}

/// Encode a `TracesData` message into protobuf bytes
pub fn encode_traces(traces: &TracesData) -> Vec<u8> {
    traces.encode_to_vec()
}

/// Read and decode a protobuf-encoded `TracesData` file
pub fn read_traces_file<P: AsRef<Path>>(path: P) -> Result<TracesData> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| OtlpError::Io {
        path: path.display().to_string(),
        source,
    })?;
    decode_traces(bytes.as_slice())
}

/// Span counting over the resource → scope → span hierarchy
pub trait TracesDataExt {
    /// Returns the total number of spans across all resource and scope groups
    fn span_count(&self) -> usize;
}

impl TracesDataExt for TracesData {
    fn span_count(&self) -> usize {
        self.resource_spans
            .iter()
            .flat_map(|rs| &rs.scope_spans)
            .map(|ss| ss.spans.len())
            .sum()
    }
}

/// Constructors for scalar attributes
pub trait KeyValueExt: Sized {
    fn string(key: impl Into<String>, value: impl Into<String>) -> Self;
    fn bool(key: impl Into<String>, value: bool) -> Self;
    fn int(key: impl Into<String>, value: i64) -> Self;
    fn double(key: impl Into<String>, value: f64) -> Self;
}

fn key_value(key: impl Into<String>, value: any_value::Value) -> KeyValue {
    KeyValue {
        key: key.into(),
        value: Some(AnyValue { value: Some(value) }),
    }
}

impl KeyValueExt for KeyValue {
    fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        key_value(key, any_value::Value::StringValue(value.into()))
    }

    fn bool(key: impl Into<String>, value: bool) -> Self {
        key_value(key, any_value::Value::BoolValue(value))
    }

    fn int(key: impl Into<String>, value: i64) -> Self {
        key_value(key, any_value::Value::IntValue(value))
    }

    fn double(key: impl Into<String>, value: f64) -> Self {
        key_value(key, any_value::Value::DoubleValue(value))
    }
}
