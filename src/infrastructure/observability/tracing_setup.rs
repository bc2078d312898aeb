//! Subscriber setup with optional OpenTelemetry export

use opentelemetry::{
    trace::{TraceError, TracerProvider as _},
    KeyValue,
};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

use super::config::TracingConfig;
use crate::infrastructure::logging::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn fmt_layer(format: LogFormat) -> BoxedLayer {
    let layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    match format {
        LogFormat::Json => layer.json().with_file(true).with_line_number(true).boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
    }
}

/// Builds the OTLP layer and registers its provider globally
fn export_layer(config: &TracingConfig) -> Result<BoxedLayer, TraceError> {
    let provider = build_provider(config)?;
    let tracer = provider.tracer(config.service_name.clone());
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
}

/// Installs the global subscriber
///
/// An exporter that fails to build leaves plain logging in place.
pub fn init_tracing(logging_config: &LoggingConfig, tracing_config: &TracingConfig) {
    let export = tracing_config
        .enabled
        .then(|| export_layer(tracing_config));

    let mut layers = vec![fmt_layer(logging_config.format)];
    let export_error = match export {
        Some(Ok(layer)) => {
            layers.push(layer);
            None
        }
        Some(Err(e)) => Some(e),
        None => None,
    };
    let exporting = layers.len() > 1;

    tracing_subscriber::registry()
        .with(layers)
        .with(logging_config.env_filter())
        .init();

    match export_error {
        Some(e) => tracing::warn!(error = %e, "OpenTelemetry export disabled"),
        None if exporting => tracing::info!(
            endpoint = %tracing_config.otlp_endpoint,
            sampling_ratio = tracing_config.sampling_ratio,
            "Tracing initialized with OTLP export"
        ),
        None => tracing::info!(level = %logging_config.level, "Tracing initialized"),
    }
}

fn sampler(ratio: f64) -> Sampler {
    if ratio >= 1.0 {
        Sampler::AlwaysOn
    } else if ratio <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(ratio)
    }
}

fn build_provider(config: &TracingConfig) -> Result<TracerProvider, TraceError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()?;

    Ok(TracerProvider::builder()
        .with_sampler(sampler(config.sampling_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(Resource::new([
            KeyValue::new("service.name", config.service_name.clone()),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]))
        .with_batch_exporter(exporter, runtime::Tokio)
        .build())
}

/// Flushes pending spans
pub fn shutdown_tracing() {
    opentelemetry::global::shutdown_tracer_provider();
    tracing::info!("Tracing shutdown complete");
}
