//! Attribute flattening
//!
//! Converts OTLP `KeyValue`s (whose values are an `AnyValue` oneof) into the
//! typed [`KeyValue`] records the backend understands. Only scalar values are
//! supported: arrays, key-value lists and raw bytes are skipped, as are keys
//! without a value.

use crate::model::{KeyValue, Value};
use otlp::any_value;

/// Flatten an attribute set, keeping input order.
///
/// Unsupported values are dropped without error, so the output is at most as
/// long as the input.
pub fn flatten_attributes(attrs: &[otlp::KeyValue]) -> Vec<KeyValue> {
    let mut out = Vec::with_capacity(attrs.len());

    for attr in attrs {
        let value = attr
            .value
            .as_ref()
            .and_then(|any| any.value.as_ref())
            .and_then(scalar_value);

        if let Some(value) = value {
            out.push(KeyValue {
                key: attr.key.clone(),
                value,
            });
        }
    }

    out
}

fn scalar_value(value: &any_value::Value) -> Option<Value> {
    match value {
        any_value::Value::StringValue(s) => Some(Value::String(s.clone())),
        any_value::Value::BoolValue(b) => Some(Value::Bool(*b)),
        any_value::Value::IntValue(i) => Some(Value::Int64(*i)),
        any_value::Value::DoubleValue(d) => Some(Value::Float64(*d)),
        // TODO: map nested arrays and kvlists once the backend accepts composite values
        any_value::Value::ArrayValue(_)
        | any_value::Value::KvlistValue(_)
        | any_value::Value::BytesValue(_) => None,
    }
}
