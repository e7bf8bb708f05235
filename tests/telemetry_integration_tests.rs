//! Telemetry Integration Tests
//!
//! Subscriber installation is process-global, so every assertion that
//! touches it lives in a single test.

use redis_apm::pool::testing::MockPool;
use redis_apm::telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
use redis_apm::{InstrumentedPool, Network, Transaction, Value};

#[tokio::test]
async fn test_subscriber_installs_once_and_segments_flow() {
    let config = TelemetryConfig {
        otel_endpoint: None,
        ..TelemetryConfig::for_service("redis-apm-tests")
    }
    .with_default_filter("debug")
    .with_format(LogFormat::Compact);

    init_telemetry(&config).expect("first installation should succeed");
    assert!(matches!(
        init_telemetry(&config),
        Err(TelemetryError::TracingInit(_))
    ));

    // Default transactions report through the installed subscriber
    let mock = MockPool::new();
    mock.push_ok(Value::SimpleString("PONG".to_string()));
    let pool = InstrumentedPool::from_pool(mock, Network::Tcp, "localhost:6379").unwrap();
    let txn = Transaction::new("telemetry-smoke");

    let health = pool.health_check(Some(&txn)).await;
    assert!(health.healthy);
    txn.end();
}
