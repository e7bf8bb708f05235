//! Pool health and statistics

use crate::backend::CommandPool;
use crate::pool::InstrumentedPool;
use redis_apm_telemetry::Transaction;
use std::time::{Duration, Instant};

/// Health status for a Redis pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisHealth {
    /// Did `PING` succeed?
    pub healthy: bool,
    /// Round-trip time of the check
    pub latency: Duration,
    /// Server reply on success
    pub response: Option<String>,
    /// Error message if unhealthy
    pub error: Option<String>,
}

/// Connection pool statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Configured maximum number of connections
    pub max_size: usize,
    /// Connections currently open
    pub size: usize,
    /// Open connections sitting idle
    pub available: usize,
    /// Callers waiting for a connection
    pub waiting: usize,
}

impl<P: CommandPool> InstrumentedPool<P> {
    /// `PING` the server through the instrumented path.
    ///
    /// Unlike `execute`, failures are reported in the returned status rather
    /// than as an error.
    pub async fn health_check(&self, txn: Option<&Transaction>) -> RedisHealth {
        let start = Instant::now();
        let result: Result<String, P::Error> = self.execute(txn, "PING", &[]).await;
        let latency = start.elapsed();

        match result {
            Ok(response) => RedisHealth {
                healthy: true,
                latency,
                response: Some(response),
                error: None,
            },
            Err(e) => {
                tracing::warn!(
                    net.peer.name = %self.host(),
                    net.peer.port = %self.port_path_or_id(),
                    error = %e,
                    "Redis health check failed"
                );
                RedisHealth {
                    healthy: false,
                    latency,
                    response: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

impl InstrumentedPool<deadpool_redis::Pool> {
    /// Current statistics of the wrapped pool
    pub fn stats(&self) -> PoolStats {
        let status = self.inner().status();
        PoolStats {
            max_size: status.max_size,
            size: status.size,
            available: status.available,
            waiting: status.waiting,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::address::Network;
    use crate::pool::InstrumentedPool;
    use crate::testing::{MockError, MockPool};
    use redis::Value;
    use redis_apm_telemetry::{InMemoryRecorder, Transaction};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_check_success() {
        let mock = MockPool::new();
        mock.push_ok(Value::SimpleString("PONG".to_string()));
        let pool = InstrumentedPool::from_pool(mock, Network::Tcp, "localhost:6379").unwrap();

        let recorder = Arc::new(InMemoryRecorder::new());
        let txn = Transaction::with_recorder("health", recorder.clone());
        let health = pool.health_check(Some(&txn)).await;

        assert!(health.healthy);
        assert_eq!(health.response.as_deref(), Some("PONG"));
        assert_eq!(recorder.ended()[0].0.operation, "ping");
        assert_eq!(recorder.ended()[0].0.parameterized_query, "PING");
    }

    #[tokio::test]
    async fn test_health_check_failure() {
        let mock = MockPool::new();
        mock.push_err(MockError::Injected("connection refused".to_string()));
        let pool = InstrumentedPool::from_pool(mock, Network::Tcp, "localhost:6379").unwrap();

        let health = pool.health_check(None).await;

        assert!(!health.healthy);
        assert_eq!(
            health.error.as_deref(),
            Some("injected failure: connection refused")
        );
    }

    #[tokio::test]
    async fn test_stats_before_first_connection() {
        let pool = InstrumentedPool::new(
            Network::Tcp,
            "127.0.0.1:6379",
            4,
            crate::config::PoolOptions::default(),
        )
        .unwrap();

        let stats = pool.stats();
        assert_eq!(stats.max_size, 4);
        assert_eq!(stats.size, 0);
        assert_eq!(stats.waiting, 0);
    }
}
