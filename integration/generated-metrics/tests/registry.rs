use generated_metrics::metrics::{
    self, HttpRequestDurationSecondsLabels, HttpRequestsTotalLabels, QueueDepthLabels,
};
use prometheus::{Encoder, Registry, TextEncoder};

fn exposition(registry: &Registry) -> String {
    let mut buf = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buf)
        .unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_register_declares_every_metric() {
    let registry = Registry::new();
    let m = metrics::register(&registry).unwrap();

    // Labeled families only appear once a label combination has been used.
    m.IncHttpRequestsTotal(HttpRequestsTotalLabels {
        Method: "GET",
        Status: "200",
    });
    m.ObserveHttpRequestDurationSeconds(
        HttpRequestDurationSecondsLabels {
            Method: "GET",
            Status: "200",
        },
        0.1,
    );
    m.SetQueueDepth(QueueDepthLabels { Queue: "ingest" }, 1.0);

    let text = exposition(&registry);
    for expected in [
        "# TYPE http_requests_total counter\n",
        "# TYPE http_request_duration_seconds histogram\n",
        "# TYPE system_uptime_seconds gauge\n",
        "# TYPE jobs_processed_total counter\n",
        "# TYPE queue_depth gauge\n",
        "# TYPE queue_wait_seconds histogram\n",
    ] {
        assert!(text.contains(expected), "{expected:?} missing from {text}");
    }
}

#[test]
fn test_register_twice_fails() {
    let registry = Registry::new();
    metrics::register(&registry).unwrap();
    assert!(metrics::register(&registry).is_err());
}

#[test]
fn test_unlabeled_accessors() {
    let registry = Registry::new();
    let m = metrics::register(&registry).unwrap();

    m.IncJobsProcessedTotal();
    m.IncJobsProcessedTotal();
    m.SetSystemUptimeSeconds(12.5);
    m.ObserveQueueWaitSeconds(0.5);

    let text = exposition(&registry);
    assert!(text.contains("jobs_processed_total 2\n"), "{text}");
    assert!(text.contains("system_uptime_seconds 12.5\n"), "{text}");
    assert!(text.contains("queue_wait_seconds_bucket{le=\"1\"} 1\n"), "{text}");
    assert!(text.contains("queue_wait_seconds_count 1\n"), "{text}");
}

#[test]
fn test_labeled_accessors() {
    let registry = Registry::new();
    let m = metrics::register(&registry).unwrap();

    let ok = HttpRequestsTotalLabels {
        Method: "GET",
        Status: "200",
    };
    m.IncHttpRequestsTotal(ok);
    m.IncHttpRequestsTotal(ok);
    m.ObserveHttpRequestDurationSeconds(
        HttpRequestDurationSecondsLabels {
            Method: "GET",
            Status: "200",
        },
        0.02,
    );
    m.SetQueueDepth(QueueDepthLabels { Queue: "ingest" }, 4.0);

    let text = exposition(&registry);
    assert!(
        text.contains("http_requests_total{method=\"GET\",status=\"200\"} 2\n"),
        "{text}"
    );
    assert!(
        text.contains("http_request_duration_seconds_count{method=\"GET\",status=\"200\"} 1\n"),
        "{text}"
    );
    assert!(text.contains("queue_depth{queue=\"ingest\"} 4\n"), "{text}");
}

#[test]
fn test_help_is_exported() {
    let registry = Registry::new();
    metrics::register(&registry).unwrap();

    let text = exposition(&registry);
    assert!(text.contains("# HELP system_uptime_seconds Seconds since the process started\n"));
    assert!(text.contains("# HELP jobs_processed_total jobs_processed_total\n"));
}
