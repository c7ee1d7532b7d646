use super::*;

#[test]
fn test_build_tracer_provider() {
    let provider = build_tracer_provider("http://localhost:4318/v1/traces")
        .expect("Failed to build the tracer provider");

    let _tracer = provider.tracer("test");
    let _ = provider.shutdown();
}

#[test]
fn test_service_name() {
    assert_eq!(SERVICE_NAME, "vc_data_fetcher");
    assert_eq!(OTLP_ENDPOINT_ENV, "OTEL_EXPORTER_OTLP_ENDPOINT");
}
