//! # redis-apm
//!
//! Redis connection pooling with APM datastore segments.
//!
//! Wrap a pool once at startup, then pass the current [`Transaction`] (or
//! `None`) into each call. Every command or pipeline run under a transaction
//! records one segment labelled with the command, the server address, and a
//! readable rendering of what was sent.
//!
//! ## Crates
//!
//! - [`pool`]: the [`InstrumentedPool`] and its command descriptors
//! - [`telemetry`]: transactions, segments, recorders and subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use redis_apm::{Command, InstrumentedPool, Network, PoolOptions, Transaction};
//! use redis_apm::telemetry::{TelemetryConfig, init_telemetry};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! init_telemetry(&TelemetryConfig::for_service("checkout"))?;
//!
//! let pool = InstrumentedPool::new(Network::Tcp, "127.0.0.1:6379", 16, PoolOptions::default())?;
//! let txn = Transaction::new("POST /cart");
//!
//! let items: i64 = pool.execute(Some(&txn), "HLEN", &["cart:7"]).await?;
//! let _: ((), ()) = pool
//!     .execute_pipeline(
//!         Some(&txn),
//!         &[
//!             Command::with_args("HSET", ["cart:7", "sku-1", "2"]),
//!             Command::with_args("EXPIRE", ["cart:7", "3600"]),
//!         ],
//!     )
//!     .await?;
//! # let _ = items;
//! txn.end();
//! # Ok(())
//! # }
//! ```

pub use redis_apm_pool as pool;
pub use redis_apm_telemetry as telemetry;

pub use redis_apm_pool::{
    Command, CommandPool, ConfigError, ConstructError, InstrumentedPool, Network, PeerAddress,
    PoolConfig, PoolOptions, PoolStats, RedisHealth, pipeline_operation, pipeline_query,
};
pub use redis_apm_telemetry::{
    DatastoreProduct, DatastoreSegment, InMemoryRecorder, SegmentKind, SegmentRecord,
    SegmentRecorder, Transaction, TracingRecorder,
};

/// Reply values, for callers decoding into [`redis::Value`]
pub use redis::Value;
