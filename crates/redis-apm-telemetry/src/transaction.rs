//! Transactions
//!
//! A transaction is the application-level unit of work that datastore
//! segments are recorded against. It owns the recorder segments report to
//! and a root `tracing` span that segment spans nest under.

use crate::recorder::{SegmentKind, SegmentRecord, SegmentRecorder, TracingRecorder};
use crate::segment::{DatastoreSegment, SegmentStartTime};
use crate::tags::DatastoreProduct;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique transaction identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Generate a random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monitoring transaction handle.
///
/// Shared by reference across the datastore calls of one unit of work; all
/// methods take `&self`.
#[derive(Debug)]
pub struct Transaction {
    id: TransactionId,
    name: String,
    start_time: chrono::DateTime<chrono::Utc>,
    recorder: Arc<dyn SegmentRecorder>,
    span: tracing::Span,
}

impl Transaction {
    /// Start a transaction that reports segments through `tracing`
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_recorder(name, Arc::new(TracingRecorder))
    }

    /// Start a transaction that reports segments to `recorder`
    pub fn with_recorder(name: impl Into<String>, recorder: Arc<dyn SegmentRecorder>) -> Self {
        let name = name.into();
        let id = TransactionId::generate();
        let span = tracing::info_span!(
            "transaction",
            txn.id = %id,
            txn.name = %name,
            otel.name = %name
        );

        Self {
            id,
            name,
            start_time: chrono::Utc::now(),
            recorder,
            span,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_time(&self) -> chrono::DateTime<chrono::Utc> {
        self.start_time
    }

    /// Root span of this transaction
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// Mark the start of a segment
    pub fn start_segment_now(&self) -> SegmentStartTime {
        SegmentStartTime::now()
    }

    /// Open a datastore segment; it is closed by [`DatastoreSegment::end`] or on drop
    pub fn start_datastore_segment(
        &self,
        product: DatastoreProduct,
        kind: SegmentKind,
        operation: impl Into<String>,
        host: impl Into<String>,
        port_path_or_id: impl Into<String>,
        parameterized_query: impl Into<String>,
    ) -> DatastoreSegment {
        let start_time = self.start_segment_now();
        let record = SegmentRecord {
            transaction_id: self.id,
            transaction_name: self.name.clone(),
            product,
            kind,
            operation: operation.into(),
            host: host.into(),
            port_path_or_id: port_path_or_id.into(),
            parameterized_query: parameterized_query.into(),
        };

        DatastoreSegment::open(start_time, record, Arc::clone(&self.recorder), &self.span)
    }

    /// Finish the transaction
    pub fn end(self) {
        let elapsed = chrono::Utc::now() - self.start_time;
        let _enter = self.span.enter();
        tracing::debug!(
            duration_ms = elapsed.num_milliseconds(),
            "Transaction ended"
        );
    }
}
