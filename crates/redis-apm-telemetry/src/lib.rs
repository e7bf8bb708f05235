//! redis-apm Telemetry
//!
//! The monitoring side of redis-apm: transactions, timed datastore segments,
//! pluggable segment recorders, and the subscriber/exporter setup that ships
//! them somewhere useful.
//!
//! A [`Transaction`] is the unit of work an application is measuring (an HTTP
//! request, a job). Datastore calls made on its behalf open a
//! [`DatastoreSegment`] that is closed exactly once, either explicitly with
//! [`DatastoreSegment::end`] or when the guard is dropped.
//!
//! ## Feature Flags
//!
//! - `subscriber` (default): subscriber installation via `tracing-subscriber`
//! - `metrics`: Prometheus-backed [`MetricsRecorder`](metrics::MetricsRecorder)
//! - `opentelemetry`: OTLP span export

pub mod recorder;
pub mod segment;
pub mod tags;
pub mod transaction;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod otel;

pub use recorder::{
    CompositeRecorder, InMemoryRecorder, SegmentKind, SegmentRecord, SegmentRecorder,
    TracingRecorder,
};
pub use segment::{DatastoreSegment, SegmentStartTime};
pub use tags::DatastoreProduct;
pub use transaction::{Transaction, TransactionId};

#[cfg(feature = "metrics")]
pub use metrics::{MetricsError, MetricsRecorder};

/// Latency buckets for datastore segment histograms.
/// Covers sub-millisecond cache hits up to multi-second stalls.
pub const LATENCY_BUCKETS: &[f64] = &[
    0.0005, // 0.5ms
    0.001,  // 1ms
    0.005,  // 5ms
    0.01,   // 10ms
    0.02,   // 20ms
    0.05,   // 50ms
    0.1,    // 100ms
    0.2,    // 200ms
    0.5,    // 500ms
    1.0,    // 1s
    2.5,    // 2.5s
    5.0,    // 5s
];

/// Output format for the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Human-readable single-line output
    Compact,
}

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to exported telemetry
    pub service_name: String,
    /// Default filter directive when `RUST_LOG` is unset
    pub default_filter: String,
    /// Subscriber output format
    pub format: LogFormat,
    /// OpenTelemetry endpoint (optional)
    pub otel_endpoint: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "redis-apm".to_string(),
            default_filter: "info".to_string(),
            format: LogFormat::default(),
            otel_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
        }
    }
}

impl TelemetryConfig {
    /// Create config for a named service
    pub fn for_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the default filter directive
    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    /// Set the output format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the OTLP endpoint
    pub fn with_otel_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otel_endpoint = Some(endpoint.into());
        self
    }

    /// Exporter settings when an OTLP endpoint is configured
    pub fn otel_config(&self) -> Option<otel::OtelConfig> {
        let endpoint = self.otel_endpoint.clone()?;
        Some(
            otel::OtelConfig::new(endpoint, self.service_name.clone())
                .with_default_filter(self.default_filter.clone())
                .with_format(self.format),
        )
    }
}

/// Install the global tracing subscriber.
///
/// When an OTLP endpoint is configured and the `opentelemetry` feature is
/// enabled, segments are exported through [`otel::init_otel_exporter`]
/// instead of the local formatter.
#[cfg(feature = "subscriber")]
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    #[cfg(feature = "opentelemetry")]
    if let Some(otel_config) = config.otel_config() {
        return otel::init_otel_exporter(&otel_config);
    }

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let registry = tracing_subscriber::registry().with(env_filter(&config.default_filter)?);
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
        service = config.service_name,
        filter = config.default_filter,
        "Initialized structured tracing"
    );

    Ok(())
}

/// `RUST_LOG` when set, otherwise `default_filter`
#[cfg(feature = "subscriber")]
pub(crate) fn env_filter(
    default_filter: &str,
) -> Result<tracing_subscriber::EnvFilter, TelemetryError> {
    use tracing_subscriber::EnvFilter;

    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| TelemetryError::Config(format!("Invalid filter directive: {}", e))),
    }
}

/// Telemetry setup errors
#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),

    #[error("OpenTelemetry setup failed: {0}")]
    OpenTelemetryInit(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[cfg(feature = "metrics")]
    #[error("Metrics error: {0}")]
    Metrics(#[from] metrics::MetricsError),
}
