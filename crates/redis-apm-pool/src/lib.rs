//! # redis-apm Pool
//!
//! A Redis connection pool that records an APM datastore segment for every
//! command or pipeline run on behalf of a [`Transaction`].
//!
//! Pooling, encoding and I/O are done by `deadpool-redis`; this crate only
//! labels the call and forwards it. Errors come back exactly as the pool
//! produced them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use redis_apm_pool::{Command, InstrumentedPool, Network, PoolOptions};
//! use redis_apm_telemetry::Transaction;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = InstrumentedPool::new(Network::Tcp, "127.0.0.1:6379", 10, PoolOptions::default())?;
//! let txn = Transaction::new("GET /profile");
//!
//! let _: () = pool.execute(Some(&txn), "SET", &["user:1", "ada"]).await?;
//! let (name, visits): (String, i64) = pool
//!     .execute_pipeline(
//!         Some(&txn),
//!         &[Command::new("GET").arg("user:1"), Command::new("INCR").arg("visits")],
//!     )
//!     .await?;
//! # let _ = (name, visits);
//! txn.end();
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `testing`: exposes [`testing::MockPool`], a scripted in-process backend

pub mod address;
pub mod backend;
pub mod command;
pub mod config;
pub mod error;
pub mod health;
pub mod pool;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use address::{Network, NetworkParseError, PeerAddress, parse_address};
pub use backend::CommandPool;
pub use command::{Command, pipeline_operation, pipeline_query};
pub use config::{ConfigError, PoolConfig, PoolOptions};
pub use error::ConstructError;
pub use health::{PoolStats, RedisHealth};
pub use pool::InstrumentedPool;

pub use redis_apm_telemetry::Transaction;
