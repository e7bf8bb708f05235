//! Datastore Metrics
//!
//! Prometheus-backed [`SegmentRecorder`]. Labels are limited to the product
//! and segment kind; command names and pipeline labels stay on spans, where
//! their cardinality is harmless.

use crate::LATENCY_BUCKETS;
use crate::recorder::{SegmentRecord, SegmentRecorder};
use prometheus::{CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::time::Duration;
use thiserror::Error;

/// Segment metrics registered in their own registry
#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    registry: Registry,
    segments_total: CounterVec,             // cardinality: products × 2
    segments_in_flight: GaugeVec,           // cardinality: products × 2
    segment_duration_seconds: HistogramVec, // cardinality: products × 2
}

impl MetricsRecorder {
    /// Create recorder with metric names prefixed by `namespace`
    pub fn new(namespace: &str) -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let segments_total = CounterVec::new(
            Opts::new(
                format!("{}_datastore_segments_total", namespace),
                "Total number of datastore segments by product and kind",
            ),
            &["product", "kind"],
        )?;

        let segments_in_flight = GaugeVec::new(
            Opts::new(
                format!("{}_datastore_segments_in_flight", namespace),
                "Datastore segments currently open",
            ),
            &["product", "kind"],
        )?;

        let segment_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                format!("{}_datastore_segment_duration_seconds", namespace),
                "Datastore segment duration in seconds by product and kind",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["product", "kind"],
        )?;

        registry.register(Box::new(segments_total.clone()))?;
        registry.register(Box::new(segments_in_flight.clone()))?;
        registry.register(Box::new(segment_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            segments_total,
            segments_in_flight,
            segment_duration_seconds,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in Prometheus text exposition format
    pub fn render(&self) -> Result<String, MetricsError> {
        let encoder = prometheus::TextEncoder::new();
        encoder
            .encode_to_string(&self.registry.gather())
            .map_err(MetricsError::from)
    }

    pub fn segments_total(&self, segment: &SegmentRecord) -> f64 {
        self.segments_total
            .with_label_values(&[segment.product.as_str(), segment.kind.as_str()])
            .get()
    }

    pub fn segments_in_flight(&self, segment: &SegmentRecord) -> f64 {
        self.segments_in_flight
            .with_label_values(&[segment.product.as_str(), segment.kind.as_str()])
            .get()
    }

    pub fn duration_sample_count(&self, segment: &SegmentRecord) -> u64 {
        self.segment_duration_seconds
            .with_label_values(&[segment.product.as_str(), segment.kind.as_str()])
            .get_sample_count()
    }
}

impl SegmentRecorder for MetricsRecorder {
    fn segment_started(&self, segment: &SegmentRecord) {
        let labels = [segment.product.as_str(), segment.kind.as_str()];
        self.segments_total.with_label_values(&labels).inc();
        self.segments_in_flight.with_label_values(&labels).inc();
    }

    fn segment_ended(&self, segment: &SegmentRecord, duration: Duration) {
        let labels = [segment.product.as_str(), segment.kind.as_str()];
        self.segments_in_flight.with_label_values(&labels).dec();
        self.segment_duration_seconds
            .with_label_values(&labels)
            .observe(duration.as_secs_f64());
    }
}

/// Metrics errors
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}
