//! Datastore Segments
//!
//! A [`DatastoreSegment`] is a timed span recorded against a transaction. It
//! is a guard: whichever happens first of [`DatastoreSegment::end`] or drop
//! closes it, and it is never closed twice.

use crate::recorder::{SegmentKind, SegmentRecord, SegmentRecorder};
use crate::tags::DatastoreProduct;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Point in time a segment started, both monotonic and wall-clock
#[derive(Debug, Clone, Copy)]
pub struct SegmentStartTime {
    instant: Instant,
    wall: chrono::DateTime<chrono::Utc>,
}

impl SegmentStartTime {
    pub fn now() -> Self {
        Self {
            instant: Instant::now(),
            wall: chrono::Utc::now(),
        }
    }

    pub fn instant(&self) -> Instant {
        self.instant
    }

    pub fn wall_clock(&self) -> chrono::DateTime<chrono::Utc> {
        self.wall
    }

    pub fn elapsed(&self) -> Duration {
        self.instant.elapsed()
    }
}

/// Open datastore segment
#[derive(Debug)]
pub struct DatastoreSegment {
    start_time: SegmentStartTime,
    record: SegmentRecord,
    recorder: Arc<dyn SegmentRecorder>,
    span: tracing::Span,
    ended: bool,
}

impl DatastoreSegment {
    pub(crate) fn open(
        start_time: SegmentStartTime,
        record: SegmentRecord,
        recorder: Arc<dyn SegmentRecorder>,
        parent: &tracing::Span,
    ) -> Self {
        let span = tracing::info_span!(
            parent: parent,
            "datastore",
            otel.name = %record.operation,
            otel.kind = "client",
            db.system = record.product.as_str(),
            db.operation = %record.operation,
            db.statement = %record.parameterized_query,
            net.peer.name = %record.host,
            net.peer.port = %record.port_path_or_id,
            segment.kind = record.kind.as_str()
        );

        recorder.segment_started(&record);

        Self {
            start_time,
            record,
            recorder,
            span,
            ended: false,
        }
    }

    pub fn start_time(&self) -> &SegmentStartTime {
        &self.start_time
    }

    pub fn product(&self) -> DatastoreProduct {
        self.record.product
    }

    pub fn kind(&self) -> SegmentKind {
        self.record.kind
    }

    pub fn operation(&self) -> &str {
        &self.record.operation
    }

    pub fn host(&self) -> &str {
        &self.record.host
    }

    pub fn port_path_or_id(&self) -> &str {
        &self.record.port_path_or_id
    }

    pub fn parameterized_query(&self) -> &str {
        &self.record.parameterized_query
    }

    pub fn record(&self) -> &SegmentRecord {
        &self.record
    }

    /// Span covering the datastore call, for `Instrument`-ing its future
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// Duration so far
    pub fn duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Close the segment
    pub fn end(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.recorder
            .segment_ended(&self.record, self.start_time.elapsed());
    }
}

impl Drop for DatastoreSegment {
    fn drop(&mut self) {
        self.finish();
    }
}
