//! Projection of OTLP traces into flat spans
//!
//! This module provides [`Projection`], an iterator that walks the nested
//! trace structure (TracesData -> ResourceSpans -> ScopeSpans -> Span) and
//! yields one [`OutputSpan`] per span, in traversal order. Resource
//! attributes are flattened once per resource group and shared between all of
//! its spans; the instrumentation scope is captured once per scope group.
//!
//! # Example
//!
//! ```
//! use exporter::projection::project;
//! use otlp::{ResourceSpans, ScopeSpans, Span, TracesData};
//!
//! let traces = TracesData {
//!     resource_spans: vec![ResourceSpans {
//!         scope_spans: vec![ScopeSpans {
//!             spans: vec![Span { name: "a".into(), ..Default::default() }],
//!             ..Default::default()
//!         }],
//!         ..Default::default()
//!     }],
//! };
//!
//! let names: Vec<_> = project(&traces).map(|span| span.name).collect();
//! assert_eq!(names, ["a"]);
//! ```

use crate::attributes::flatten_attributes;
use crate::model::{KeyValue, OutputEvent, OutputLink, OutputSpan, SpanKind, StatusCode, Tracer};
use otlp::{span, status, InstrumentationScope, ResourceSpans, ScopeSpans, Span, Status, TracesData};
use std::sync::Arc;

/// Returns an iterator over the projected spans of `traces`
pub fn project(traces: &TracesData) -> Projection<'_> {
    Projection::new(traces)
}

/// Iterator over flattened spans of a [`TracesData`]
///
/// Never reorders, filters or deduplicates: the n-th span in traversal order
/// is the n-th item.
pub struct Projection<'a> {
    /// Remaining resource groups
    resource_spans: std::slice::Iter<'a, ResourceSpans>,

    /// Remaining scope groups of the current resource
    scope_spans: std::slice::Iter<'a, ScopeSpans>,

    /// Remaining spans of the current scope
    spans: std::slice::Iter<'a, Span>,

    /// Flattened attributes of the current resource
    resource: Arc<[KeyValue]>,

    /// Scope identity of the current scope group
    tracer: Tracer,
}

impl<'a> Projection<'a> {
    /// Creates a new Projection over all spans of `traces`
    pub fn new(traces: &'a TracesData) -> Self {
        Self {
            resource_spans: traces.resource_spans.iter(),
            scope_spans: Default::default(),
            spans: Default::default(),
            resource: Arc::from(Vec::new()),
            tracer: Tracer::default(),
        }
    }
}

impl Iterator for Projection<'_> {
    type Item = OutputSpan;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(span) = self.spans.next() {
                return Some(project_span(span, &self.resource, &self.tracer));
            }

            if let Some(scope_spans) = self.scope_spans.next() {
                self.tracer = tracer(scope_spans.scope.as_ref());
                self.spans = scope_spans.spans.iter();
                continue;
            }

            let resource_spans = self.resource_spans.next()?;
            let attributes = resource_spans
                .resource
                .as_ref()
                .map(|resource| resource.attributes.as_slice())
                .unwrap_or_default();
            self.resource = Arc::from(flatten_attributes(attributes));
            self.scope_spans = resource_spans.scope_spans.iter();
        }
    }
}

/// Projects a single span with its resource and scope context
pub fn project_span(span: &Span, resource: &Arc<[KeyValue]>, tracer: &Tracer) -> OutputSpan {
    let status = span.status.as_ref();

    OutputSpan {
        id: as_u64(&span.span_id),
        parent_id: as_u64(&span.parent_span_id),
        trace_id: trace_id(&span.trace_id),

        name: span.name.clone(),
        kind: span_kind(span.kind),
        start_time: span.start_time_unix_nano as i64,
        end_time: span.end_time_unix_nano as i64,

        resource: Arc::clone(resource),
        attrs: flatten_attributes(&span.attributes),

        status_code: status_code(status),
        status_message: status.map(|s| s.message.clone()).unwrap_or_default(),

        events: project_events(&span.events),
        links: project_links(&span.links),

        tracer: tracer.clone(),
    }
}

/// Projects span events, `None` when there are none
pub fn project_events(events: &[span::Event]) -> Option<Vec<OutputEvent>> {
    if events.is_empty() {
        return None;
    }

    Some(
        events
            .iter()
            .map(|event| OutputEvent {
                name: event.name.clone(),
                attrs: flatten_attributes(&event.attributes),
                time: event.time_unix_nano as i64,
            })
            .collect(),
    )
}

/// Projects span links, `None` when there are none
pub fn project_links(links: &[span::Link]) -> Option<Vec<OutputLink>> {
    if links.is_empty() {
        return None;
    }

    Some(
        links
            .iter()
            .map(|link| OutputLink {
                trace_id: trace_id(&link.trace_id),
                span_id: as_u64(&link.span_id),
                attrs: flatten_attributes(&link.attributes),
            })
            .collect(),
    )
}

/// Interprets an 8-byte span id as a little-endian u64.
///
/// Shorter ids are zero-padded, longer ones truncated.
pub fn as_u64(id: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let len = id.len().min(buf.len());
    buf[..len].copy_from_slice(&id[..len]);
    u64::from_le_bytes(buf)
}

/// Copies a trace id into a fixed 16-byte array, zero-padding or truncating
pub fn trace_id(id: &[u8]) -> [u8; 16] {
    let mut buf = [0u8; 16];
    let len = id.len().min(buf.len());
    buf[..len].copy_from_slice(&id[..len]);
    buf
}

/// Maps an OTLP span kind; unspecified and unknown values become internal
pub fn span_kind(kind: i32) -> SpanKind {
    match span::SpanKind::try_from(kind) {
        Ok(span::SpanKind::Server) => SpanKind::Server,
        Ok(span::SpanKind::Client) => SpanKind::Client,
        Ok(span::SpanKind::Producer) => SpanKind::Producer,
        Ok(span::SpanKind::Consumer) => SpanKind::Consumer,
        Ok(span::SpanKind::Internal) | Ok(span::SpanKind::Unspecified) | Err(_) => {
            SpanKind::Internal
        }
    }
}

/// Maps an OTLP status; a missing status or unknown code becomes unset
pub fn status_code(status: Option<&Status>) -> StatusCode {
    let Some(status) = status else {
        return StatusCode::Unset;
    };

    match status::StatusCode::try_from(status.code) {
        Ok(status::StatusCode::Ok) => StatusCode::Ok,
        Ok(status::StatusCode::Error) => StatusCode::Error,
        Ok(status::StatusCode::Unset) | Err(_) => StatusCode::Unset,
    }
}

fn tracer(scope: Option<&InstrumentationScope>) -> Tracer {
    scope
        .map(|scope| Tracer {
            name: scope.name.clone(),
            version: scope.version.clone(),
        })
        .unwrap_or_default()
}
