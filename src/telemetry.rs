use anyhow::Context;
use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;

/// Sets up OTLP span export when `OTEL_EXPORTER_OTLP_ENDPOINT` is present;
/// otherwise tracing stays local and span-context injection is a no-op.
/// The W3C tracecontext propagator is installed either way so outbound
/// headers use the standard format.
pub fn init_tracer_provider() -> anyhow::Result<Option<SdkTracerProvider>> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_err() {
        return Ok(None);
    }

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .context("failed to build OTLP exporter")?;
    let resource = Resource::builder()
        .with_attributes([
            KeyValue::new("service.name", "jobstat"),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ])
        .build();
    let provider = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build();
    global::set_tracer_provider(provider.clone());

    Ok(Some(provider))
}

/// Flushes any buffered spans at process exit.
pub fn shutdown(provider: Option<SdkTracerProvider>) {
    if let Some(provider) = provider {
        if let Err(err) = provider.shutdown() {
            eprintln!("failed to shutdown tracer provider: {err}");
        }
    }
}
