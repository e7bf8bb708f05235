//! Segment Recorders
//!
//! A [`SegmentRecorder`] receives the open and close events of every datastore
//! segment started on a [`Transaction`](crate::Transaction). Recorders are
//! the seam between instrumentation and whatever backend consumes it: the
//! tracing pipeline, Prometheus, or an in-process capture for tests.

use crate::tags::DatastoreProduct;
use crate::transaction::TransactionId;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Shape of the datastore call a segment covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// One command, one round-trip
    Command,
    /// Several commands batched into one round-trip
    Pipeline,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Command => "command",
            SegmentKind::Pipeline => "pipeline",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything known about a datastore segment at the moment it opens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentRecord {
    pub transaction_id: TransactionId,
    pub transaction_name: String,
    pub product: DatastoreProduct,
    pub kind: SegmentKind,
    pub operation: String,
    pub host: String,
    pub port_path_or_id: String,
    pub parameterized_query: String,
}

/// Sink for segment lifecycle events.
///
/// Implementations are called inline on the request path and must not block.
pub trait SegmentRecorder: Send + Sync + fmt::Debug {
    /// A segment was opened
    fn segment_started(&self, segment: &SegmentRecord);

    /// A segment was closed after `duration`
    fn segment_ended(&self, segment: &SegmentRecord, duration: Duration);
}

/// Emits segment events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRecorder;

impl SegmentRecorder for TracingRecorder {
    fn segment_started(&self, segment: &SegmentRecord) {
        tracing::trace!(
            txn.id = %segment.transaction_id,
            db.system = segment.product.as_str(),
            db.operation = %segment.operation,
            "Datastore segment started"
        );
    }

    fn segment_ended(&self, segment: &SegmentRecord, duration: Duration) {
        tracing::debug!(
            txn.id = %segment.transaction_id,
            txn.name = %segment.transaction_name,
            db.system = segment.product.as_str(),
            db.operation = %segment.operation,
            db.statement = %segment.parameterized_query,
            net.peer.name = %segment.host,
            net.peer.port = %segment.port_path_or_id,
            duration_us = duration.as_micros() as u64,
            "Datastore segment ended"
        );
    }
}

/// Captures segment events in memory.
///
/// Useful for asserting on instrumentation in tests and for embedding
/// applications that forward segments themselves.
#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    started: Mutex<Vec<SegmentRecord>>,
    ended: Mutex<Vec<(SegmentRecord, Duration)>>,
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of segments opened so far
    pub fn started_count(&self) -> usize {
        self.started.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of segments closed so far
    pub fn ended_count(&self) -> usize {
        self.ended.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Segments opened but not yet closed
    pub fn open_count(&self) -> usize {
        self.started_count().saturating_sub(self.ended_count())
    }

    /// Snapshot of opened segments, in open order
    pub fn started(&self) -> Vec<SegmentRecord> {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of closed segments, in close order
    pub fn ended(&self) -> Vec<(SegmentRecord, Duration)> {
        self.ended
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.ended
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl SegmentRecorder for InMemoryRecorder {
    fn segment_started(&self, segment: &SegmentRecord) {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(segment.clone());
    }

    fn segment_ended(&self, segment: &SegmentRecord, duration: Duration) {
        self.ended
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((segment.clone(), duration));
    }
}

/// Fans segment events out to several recorders, in insertion order
#[derive(Debug, Default, Clone)]
pub struct CompositeRecorder {
    recorders: Vec<Arc<dyn SegmentRecorder>>,
}

impl CompositeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recorder
    pub fn with(mut self, recorder: Arc<dyn SegmentRecorder>) -> Self {
        self.recorders.push(recorder);
        self
    }

    pub fn len(&self) -> usize {
        self.recorders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorders.is_empty()
    }
}

impl SegmentRecorder for CompositeRecorder {
    fn segment_started(&self, segment: &SegmentRecord) {
        for recorder in &self.recorders {
            recorder.segment_started(segment);
        }
    }

    fn segment_ended(&self, segment: &SegmentRecord, duration: Duration) {
        for recorder in &self.recorders {
            recorder.segment_ended(segment, duration);
        }
    }
}
