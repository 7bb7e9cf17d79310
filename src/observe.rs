//! Request-boundary instrumentation: route buckets, the duration histogram,
//! client-origin resolution, and the middleware that ties span + metric +
//! access log together for every inbound request.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request};
use axum::http::header::CONTENT_LENGTH;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use once_cell::sync::Lazy;
use opentelemetry::trace::TraceContextExt;
use prometheus::{HistogramOpts, HistogramVec};
use tracing::{info, info_span, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Per-route request duration histogram, registered once in the default
/// registry (served by `/metrics`).
pub(crate) static REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    let hist = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "Histogram of http request durations.",
        )
        .buckets(vec![
            0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 25.0, 50.0, 100.0,
            250.0,
        ]),
        &["path"],
    )
    .expect("request duration histogram");
    prometheus::default_registry()
        .register(Box::new(hist.clone()))
        .expect("register request duration histogram");
    hist
});

/// Collapses request paths into a fixed label set so metric cardinality
/// stays bounded. Anything unrecognized lands in one catch-all bucket.
pub fn route_bucket(path: &str) -> &'static str {
    if path.starts_with("/status") {
        "/status"
    } else if path.starts_with("/metrics") {
        "/metrics"
    } else {
        "other"
    }
}

/// The "real" remote address for forwarded requests. Proxy headers win over
/// the transport peer; they are trusted unconditionally, so this service
/// must not be directly reachable by untrusted clients.
pub fn origin_addr(headers: &HeaderMap, peer: SocketAddr) -> String {
    for key in ["x-real-ip", "x-forwarded-for"] {
        if let Some(value) = headers.get(key).and_then(|v| v.to_str().ok()) {
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    peer.to_string()
}

/// Wraps every HTTP request with the full instrumentation pipeline, in
/// fixed order: bucket the route, open a span for the whole handler, time
/// it, then emit one access-log line and one histogram observation.
pub async fn middleware(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let bucket = route_bucket(req.uri().path());
    let method = req.method().clone();
    let origin = origin_addr(req.headers(), peer);
    let length = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(0);

    let span = info_span!("http.request", otel.name = %bucket, http.method = %method);
    let response = next.run(req).instrument(span.clone()).await;

    let elapsed = start.elapsed();
    let trace_id = span.context().span().span_context().trace_id().to_string();
    info!(
        origin = %origin,
        length,
        path = bucket,
        method = %method,
        status = %response.status(),
        duration_ns = elapsed.as_nanos() as u64,
        duration = %format_duration(elapsed),
        traceid = %trace_id,
        "handled request"
    );
    REQUEST_DURATION
        .with_label_values(&[bucket])
        .observe(elapsed.as_secs_f64());

    response
}

/// Same observation shape for a CLI invocation: one log line, one
/// histogram sample in the `cli` bucket. Only successful or failed
/// completions are recorded; a cancelled lookup logs as an error outcome.
pub fn observe_cli(command: &str, elapsed: Duration, ok: bool, trace_id: &str) {
    let outcome = if ok { "success" } else { "error" };
    info!(
        origin = "local",
        path = "cli",
        method = command,
        outcome,
        duration_ns = elapsed.as_nanos() as u64,
        duration = %format_duration(elapsed),
        traceid = %trace_id,
        "handled command"
    );
    REQUEST_DURATION
        .with_label_values(&["cli"])
        .observe(elapsed.as_secs_f64());
}

fn format_duration(d: Duration) -> String {
    format!("{d:?}")
}
