use axum::http::StatusCode;
use config::{Config, ExporterConfig};
use exporter::{
    project, ExporterError, KeyValue, OutputEvent, OutputLink, OutputSpan, SendError, SpanKind,
    SpanSender, StatusCode as SpanStatus, TraceExporter, Tracer,
};
use otlp::TracesData;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tests::{
    generate_traces_many_spans, generate_traces_two_spans_same_resource, FailingSender,
    MockCollector, RecordingSender, StallingSender, TEST_SPAN_END_TIME, TEST_SPAN_EVENT_TIME,
    TEST_SPAN_START_TIME,
};

fn config_for(dsn: String, max_batch_size: i64) -> ExporterConfig {
    ExporterConfig {
        dsn,
        max_batch_size,
        ..Default::default()
    }
}

fn resource() -> Arc<[KeyValue]> {
    Arc::from(vec![KeyValue::string("resource-attr", "resource-attr-val-1")])
}

fn expected_spans() -> Vec<OutputSpan> {
    let mut trace_id = [0u8; 16];
    trace_id[0] = 0xff;

    vec![
        OutputSpan {
            id: 506097522914230528,
            parent_id: u64::MAX,
            trace_id,
            name: "operationA".to_string(),
            kind: SpanKind::Internal,
            start_time: TEST_SPAN_START_TIME as i64,
            end_time: TEST_SPAN_END_TIME as i64,
            resource: resource(),
            attrs: Vec::new(),
            status_code: SpanStatus::Error,
            status_message: "status-cancelled".to_string(),
            events: Some(vec![
                OutputEvent {
                    name: "event-with-attr".to_string(),
                    attrs: vec![KeyValue::string("span-event-attr", "span-event-attr-val")],
                    time: TEST_SPAN_EVENT_TIME as i64,
                },
                OutputEvent {
                    name: "event".to_string(),
                    attrs: Vec::new(),
                    time: TEST_SPAN_EVENT_TIME as i64,
                },
            ]),
            links: None,
            tracer: Tracer::default(),
        },
        OutputSpan {
            id: 0,
            parent_id: 0,
            trace_id: [0; 16],
            name: "operationB".to_string(),
            kind: SpanKind::Internal,
            start_time: TEST_SPAN_START_TIME as i64,
            end_time: TEST_SPAN_END_TIME as i64,
            resource: resource(),
            attrs: Vec::new(),
            status_code: SpanStatus::Unset,
            status_message: String::new(),
            events: None,
            links: Some(vec![
                OutputLink {
                    trace_id: [0; 16],
                    span_id: 0,
                    attrs: vec![KeyValue::string("span-link-attr", "span-link-attr-val")],
                },
                OutputLink {
                    trace_id: [0; 16],
                    span_id: 0,
                    attrs: Vec::new(),
                },
            ]),
            tracer: Tracer::default(),
        },
    ]
}

#[test]
fn test_new_exporter_empty_config() {
    let result = TraceExporter::new(&ExporterConfig::default());
    assert!(result.is_err(), "an empty DSN must be rejected");
}

#[test]
fn test_new_exporter_rejects_non_positive_batch_size() {
    for max_batch_size in [0, -1, i64::MIN] {
        let result = TraceExporter::with_sender(max_batch_size, RecordingSender::default());
        match result {
            Err(ExporterError::InvalidBatchSize(n)) => assert_eq!(n, max_batch_size),
            Err(e) => panic!("unexpected error for {}: {}", max_batch_size, e),
            Ok(_) => panic!("batch size {} was accepted", max_batch_size),
        }
    }
}

#[tokio::test]
async fn test_empty_traces() {
    let config = config_for("https://key@api.uptrace.dev/1".to_string(), 5000);
    let exporter = TraceExporter::new(&config).expect("Failed to create exporter");

    let dropped = exporter
        .push(&TracesData::default())
        .await
        .expect("push failed");
    assert_eq!(dropped, 0);
}

#[tokio::test]
async fn test_two_spans_same_resource_over_http() {
    let collector = MockCollector::start()
        .await
        .expect("Failed to start mock collector");
    let config = config_for(collector.dsn("key", "1"), 5000);
    let exporter = TraceExporter::new(&config).expect("Failed to create exporter");

    let dropped = exporter
        .push(&generate_traces_two_spans_same_resource())
        .await
        .expect("push failed");
    assert_eq!(dropped, 0);

    let requests = collector.requests();
    assert_eq!(requests.len(), 1, "expected a single batch");

    let request = &requests[0];
    assert_eq!(request.project_id, "1");
    assert_eq!(request.authorization.as_deref(), Some("Bearer key"));
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    assert_eq!(request.content_encoding.as_deref(), Some("gzip"));
    assert_eq!(request.spans, expected_spans());

    exporter.shutdown().await.expect("shutdown failed");
}

#[tokio::test]
async fn test_resource_is_shared_within_group() {
    let sender = Arc::new(RecordingSender::default());
    let exporter =
        TraceExporter::with_sender(5000, Arc::clone(&sender)).expect("Failed to create exporter");

    exporter
        .push(&generate_traces_two_spans_same_resource())
        .await
        .expect("push failed");

    let batches = sender.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], expected_spans());
    assert!(Arc::ptr_eq(&batches[0][0].resource, &batches[0][1].resource));
}

#[tokio::test]
async fn test_dispatch_count_is_ceil_of_spans_over_batch_size() {
    let cases = [(1, 1, 1), (1, 10, 3), (2, 5, 3), (3, 4, 5), (4, 25, 1000)];

    for (resources, spans_per_resource, max_batch_size) in cases {
        let sender = Arc::new(RecordingSender::default());
        let exporter = TraceExporter::with_sender(max_batch_size, Arc::clone(&sender))
            .expect("Failed to create exporter");

        let total = resources * spans_per_resource;
        exporter
            .push(&generate_traces_many_spans(resources, spans_per_resource))
            .await
            .expect("push failed");

        let batches = sender.batches();
        let expected = total.div_ceil(max_batch_size as usize);
        assert_eq!(
            batches.len(),
            expected,
            "{} spans with batch size {}",
            total,
            max_batch_size
        );
        assert!(batches.iter().all(|b| b.len() <= max_batch_size as usize));

        let ids: Vec<u64> = sender.spans().iter().map(|s| s.id).collect();
        assert_eq!(ids, (0..total as u64).collect::<Vec<_>>(), "order must be kept");
    }
}

#[tokio::test]
async fn test_failing_sender_does_not_fail_push() {
    let sender = Arc::new(FailingSender::default());
    let exporter =
        TraceExporter::with_sender(3, Arc::clone(&sender)).expect("Failed to create exporter");

    let dropped = exporter
        .push(&generate_traces_many_spans(2, 5))
        .await
        .expect("push must not fail on send errors");

    assert_eq!(dropped, 0);
    assert_eq!(sender.attempts(), 4, "every batch is attempted");
}

#[tokio::test]
async fn test_collector_error_status_is_not_propagated() {
    let collector = MockCollector::start()
        .await
        .expect("Failed to start mock collector");
    collector.respond_with(StatusCode::INTERNAL_SERVER_ERROR);

    let config = config_for(collector.dsn("key", "7"), 1);
    let exporter = TraceExporter::new(&config).expect("Failed to create exporter");

    let dropped = exporter
        .push(&generate_traces_two_spans_same_resource())
        .await
        .expect("push failed");

    assert_eq!(dropped, 0);
    assert_eq!(collector.requests().len(), 2);
}

#[tokio::test]
async fn test_push_after_shutdown_sends_nothing() {
    let collector = MockCollector::start()
        .await
        .expect("Failed to start mock collector");
    let config = config_for(collector.dsn("key", "1"), 5000);
    let exporter = TraceExporter::new(&config).expect("Failed to create exporter");

    exporter.shutdown().await.expect("shutdown failed");
    exporter.shutdown().await.expect("second shutdown failed");

    let dropped = exporter
        .push(&generate_traces_two_spans_same_resource())
        .await
        .expect("push failed");

    assert_eq!(dropped, 0);
    assert!(collector.requests().is_empty());
}

#[tokio::test]
async fn test_concurrent_pushes() {
    let sender = Arc::new(RecordingSender::default());
    let exporter = Arc::new(
        TraceExporter::with_sender(7, Arc::clone(&sender)).expect("Failed to create exporter"),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let exporter = Arc::clone(&exporter);
            tokio::spawn(async move {
                exporter
                    .push(&generate_traces_many_spans(2, 10))
                    .await
                    .expect("push failed")
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.expect("task panicked"), 0);
    }

    let batches = sender.batches();
    assert_eq!(sender.spans().len(), 80);
    assert_eq!(batches.len(), 4 * 3);
    assert!(batches.iter().all(|b| b.len() <= 7));

    exporter.shutdown().await.expect("shutdown failed");
    assert_eq!(sender.shutdowns(), 1);
}

#[tokio::test]
async fn test_exporter_from_config_file() {
    let collector = MockCollector::start()
        .await
        .expect("Failed to start mock collector");

    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create config file");
    writeln!(
        file,
        "[exporter]\ndsn = \"{}\"\nmax_batch_size = 1",
        collector.dsn("secret", "42")
    )
    .expect("Failed to write config file");

    let config = Config::from_file(file.path()).expect("Failed to load config");
    config.validate().expect("config should be valid");

    let exporter = TraceExporter::new(&config.exporter).expect("Failed to create exporter");
    exporter
        .push(&generate_traces_two_spans_same_resource())
        .await
        .expect("push failed");

    let requests = collector.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.spans.len() == 1));
    assert!(requests.iter().all(|r| r.project_id == "42"));
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer secret"));
}

#[tokio::test]
async fn test_cancelled_push_keeps_completed_batches() {
    let sender = Arc::new(StallingSender::new(1));
    let exporter =
        TraceExporter::with_sender(2, Arc::clone(&sender)).expect("Failed to create exporter");
    let traces = generate_traces_many_spans(1, 6);

    let result = tokio::time::timeout(Duration::from_millis(200), exporter.push(&traces)).await;

    assert!(result.is_err(), "push should still be stalled on batch 2");
    assert_eq!(sender.completed(), 1);
}

#[tokio::test]
async fn test_request_timeout_is_a_send_error() {
    let collector = MockCollector::start()
        .await
        .expect("Failed to start mock collector");
    collector.stall_for(Duration::from_secs(5));

    let config = ExporterConfig {
        dsn: collector.dsn("key", "1"),
        max_batch_size: 5000,
        timeout_secs: 1,
    };
    let exporter = TraceExporter::new(&config).expect("Failed to create exporter");
    let traces = generate_traces_two_spans_same_resource();

    let spans: Vec<OutputSpan> = project(&traces).collect();
    match exporter.sender().send(&spans).await {
        Err(SendError::Http(e)) => assert!(e.is_timeout(), "expected a timeout, got {}", e),
        other => panic!("expected a transport timeout, got {:?}", other),
    }

    let started = Instant::now();
    let dropped = exporter.push(&traces).await.expect("push failed");
    assert_eq!(dropped, 0);
    assert!(
        started.elapsed() < Duration::from_secs(4),
        "push must give up after the request timeout"
    );
}
