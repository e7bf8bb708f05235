//! Instrumented pool
//!
//! [`InstrumentedPool`] wraps a [`CommandPool`] and, when handed a
//! [`Transaction`], records one datastore segment per command or pipeline.
//! Execution is forwarded unchanged and the pool's error is returned as is.

use crate::address::{Network, PeerAddress, parse_address};
use crate::backend::CommandPool;
use crate::command::{Command, pipeline_operation, pipeline_query, to_pipeline};
use crate::config::{PoolConfig, PoolOptions};
use crate::error::ConstructError;
use redis::FromRedisValue;
use redis_apm_telemetry::{DatastoreProduct, DatastoreSegment, SegmentKind, Transaction};
use std::ops::Deref;
use tracing::Instrument;

/// Redis pool that records datastore segments
#[derive(Debug, Clone)]
pub struct InstrumentedPool<P = deadpool_redis::Pool> {
    pool: P,
    network: Network,
    peer: PeerAddress,
}

impl InstrumentedPool<deadpool_redis::Pool> {
    /// Create a `deadpool-redis` pool of `size` connections to `addr` and wrap it.
    ///
    /// Connections are opened lazily by the pool; construction only fails on
    /// an unparseable address or a rejected pool configuration.
    pub fn new(
        network: Network,
        addr: &str,
        size: usize,
        options: PoolOptions,
    ) -> Result<Self, ConstructError> {
        let parsed = parse_address(network, addr)?;

        let mut config = deadpool_redis::Config::from_connection_info(parsed.info);
        config.pool = Some(options.to_deadpool(size));
        let pool = build_pool(config)?;

        tracing::info!(
            network = %network,
            net.peer.name = %parsed.peer.host,
            net.peer.port = %parsed.peer.port_path_or_id,
            pool.size = size,
            "Created instrumented Redis pool"
        );

        Ok(Self {
            pool,
            network,
            peer: parsed.peer,
        })
    }

    /// Create from a [`PoolConfig`]
    pub fn from_config(config: &PoolConfig) -> Result<Self, ConstructError> {
        Self::new(
            config.network,
            &config.address,
            config.size,
            config.options.clone(),
        )
    }
}

impl<P: CommandPool> InstrumentedPool<P> {
    /// Wrap an existing pool; `addr` is only parsed for segment labels
    pub fn from_pool(pool: P, network: Network, addr: &str) -> Result<Self, ConstructError> {
        let parsed = parse_address(network, addr)?;
        Ok(Self {
            pool,
            network,
            peer: parsed.peer,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn peer(&self) -> &PeerAddress {
        &self.peer
    }

    pub fn host(&self) -> &str {
        &self.peer.host
    }

    pub fn port_path_or_id(&self) -> &str {
        &self.peer.port_path_or_id
    }

    pub fn inner(&self) -> &P {
        &self.pool
    }

    pub fn into_inner(self) -> P {
        self.pool
    }

    /// Run `cmd args...`, recording a segment when `txn` is present
    pub async fn execute<T>(
        &self,
        txn: Option<&Transaction>,
        cmd: &str,
        args: &[&str],
    ) -> Result<T, P::Error>
    where
        T: FromRedisValue + Send,
    {
        let command = Command::with_args(cmd, args.iter().copied());
        self.execute_command(txn, &command).await
    }

    /// Run one command, recording a segment when `txn` is present
    pub async fn execute_command<T>(
        &self,
        txn: Option<&Transaction>,
        command: &Command,
    ) -> Result<T, P::Error>
    where
        T: FromRedisValue + Send,
    {
        let cmd = command.to_cmd();
        let segment = txn.map(|txn| {
            self.new_segment(
                txn,
                SegmentKind::Command,
                command.name().to_lowercase(),
                command.render(),
            )
        });

        let result = self
            .pool
            .query_cmd(&cmd)
            .instrument(segment_span(&segment))
            .await;

        if let Some(segment) = segment {
            segment.end();
        }
        result
    }

    /// Run `commands` as one pipelined round-trip, recording a single segment
    /// when `txn` is present. `T` decodes one reply per command, in order.
    pub async fn execute_pipeline<T>(
        &self,
        txn: Option<&Transaction>,
        commands: &[Command],
    ) -> Result<T, P::Error>
    where
        T: FromRedisValue + Send,
    {
        let pipeline = to_pipeline(commands);
        let segment = txn.map(|txn| {
            self.new_segment(
                txn,
                SegmentKind::Pipeline,
                pipeline_operation(commands),
                pipeline_query(commands),
            )
        });

        let result = self
            .pool
            .query_pipeline(&pipeline)
            .instrument(segment_span(&segment))
            .await;

        if let Some(segment) = segment {
            segment.end();
        }
        result
    }

    fn new_segment(
        &self,
        txn: &Transaction,
        kind: SegmentKind,
        operation: String,
        query: String,
    ) -> DatastoreSegment {
        txn.start_datastore_segment(
            DatastoreProduct::Redis,
            kind,
            operation,
            self.peer.host.as_str(),
            self.peer.port_path_or_id.as_str(),
            query,
        )
    }
}

fn build_pool(config: deadpool_redis::Config) -> Result<deadpool_redis::Pool, ConstructError> {
    Ok(config.create_pool(Some(deadpool_redis::Runtime::Tokio1))?)
}

fn segment_span(segment: &Option<DatastoreSegment>) -> tracing::Span {
    segment
        .as_ref()
        .map(|segment| segment.span().clone())
        .unwrap_or_else(tracing::Span::none)
}

impl<P> Deref for InstrumentedPool<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.pool
    }
}
