//! OpenTelemetry Integration
//!
//! Exports transaction and datastore segment spans to an OTLP collector.

use crate::{LogFormat, TelemetryError};

/// OpenTelemetry configuration
#[derive(Debug, Clone)]
pub struct OtelConfig {
    /// OTLP endpoint URL
    pub endpoint: String,
    /// Service name for telemetry
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Additional resource attributes
    pub resource_attributes: Vec<(String, String)>,
    /// Filter directive when `RUST_LOG` is unset
    pub default_filter: String,
    /// Format of the local log output alongside the exporter
    pub format: LogFormat,
}

impl OtelConfig {
    /// Create new OpenTelemetry configuration
    pub fn new(endpoint: String, service_name: String) -> Self {
        Self {
            endpoint,
            service_name,
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            resource_attributes: Vec::new(),
            default_filter: "info".to_string(),
            format: LogFormat::default(),
        }
    }

    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Add resource attribute
    pub fn with_attribute(mut self, key: String, value: String) -> Self {
        self.resource_attributes.push((key, value));
        self
    }
}

/// Initialize OpenTelemetry exporter and install it as the global subscriber
#[cfg(feature = "opentelemetry")]
pub fn init_otel_exporter(config: &OtelConfig) -> Result<(), TelemetryError> {
    use opentelemetry::KeyValue;
    use opentelemetry::trace::TracerProvider;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::Resource;
    use opentelemetry_sdk::trace::SdkTracerProvider;
    use tracing_opentelemetry::OpenTelemetryLayer;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.endpoint)
        .build()
        .map_err(|e| {
            TelemetryError::OpenTelemetryInit(format!("Failed to create exporter: {}", e))
        })?;

    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attribute(KeyValue::new(
            "service.version",
            config.service_version.clone(),
        ))
        .with_attributes(
            config
                .resource_attributes
                .iter()
                .map(|(k, v)| KeyValue::new(k.clone(), v.clone())),
        )
        .build();

    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build();

    let tracer = tracer_provider.tracer("redis-apm");

    let registry = tracing_subscriber::registry()
        .with(crate::env_filter(&config.default_filter)?)
        .with(OpenTelemetryLayer::new(tracer));
    let installed = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
    };
    installed.map_err(|e| TelemetryError::TracingInit(e.to_string()))?;

    tracing::info!(
        endpoint = config.endpoint,
        service = config.service_name,
        version = config.service_version,
        "OpenTelemetry exporter initialized"
    );

    Ok(())
}

#[cfg(not(feature = "opentelemetry"))]
pub fn init_otel_exporter(_config: &OtelConfig) -> Result<(), TelemetryError> {
    Err(TelemetryError::OpenTelemetryInit(
        "OpenTelemetry feature not enabled".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otel_config_creation() {
        let config = OtelConfig::new(
            "http://localhost:4317".to_string(),
            "redis-apm-test".to_string(),
        );

        assert_eq!(config.endpoint, "http://localhost:4317");
        assert_eq!(config.service_name, "redis-apm-test");
        assert!(config.resource_attributes.is_empty());
        assert_eq!(config.default_filter, "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_otel_config_with_attributes() {
        let config = OtelConfig::new(
            "http://localhost:4317".to_string(),
            "redis-apm-test".to_string(),
        )
        .with_attribute("deployment.environment".to_string(), "test".to_string());

        assert!(
            config
                .resource_attributes
                .iter()
                .any(|(k, v)| k == "deployment.environment" && v == "test")
        );
    }

    #[cfg(not(feature = "opentelemetry"))]
    #[test]
    fn test_exporter_requires_feature() {
        let config = OtelConfig::new("http://localhost:4317".to_string(), "svc".to_string());
        assert!(matches!(
            init_otel_exporter(&config),
            Err(TelemetryError::OpenTelemetryInit(_))
        ));
    }
}
