use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::errors::ServerError;

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;

/// Name reported as `service.name` on exported spans
pub const SERVICE_NAME: &str = "vc_data_fetcher";

/// Environment variable naming the OTLP/HTTP traces endpoint
pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Creates a tracer provider that exports spans to an OTLP/HTTP endpoint.
pub fn build_tracer_provider(endpoint: &str) -> Result<SdkTracerProvider, ServerError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_http_client(reqwest::Client::new())
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| ServerError::TelemetryError(e.to_string()))?;

    let resource = Resource::builder()
        .with_service_name(SERVICE_NAME)
        .build();

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

/// Installs the global tracing subscriber.
///
/// Log output is filtered with `RUST_LOG`. When an OTLP endpoint is given,
/// spans are exported there as well; the returned provider must be shut down
/// before exit to flush them.
pub fn init_telemetry(
    otlp_endpoint: Option<&str>,
) -> Result<Option<SdkTracerProvider>, ServerError> {
    let provider = otlp_endpoint.map(build_tracer_provider).transpose()?;
    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer("vc_data_fetcher_server"))
    });

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .map_err(|e| ServerError::TelemetryError(e.to_string()))?;

    Ok(provider)
}
