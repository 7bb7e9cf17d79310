use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use prometheus::TextEncoder;

/// GET /metrics: prometheus text exposition of the default registry.
pub async fn get_metrics() -> Response {
    let encoder = TextEncoder::new();
    match encoder.encode_to_string(&prometheus::gather()) {
        Ok(text) => (
            StatusCode::OK,
            [("content-type", "text/plain; charset=utf-8")],
            text,
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to encode metrics: {err}\n"),
        )
            .into_response(),
    }
}
