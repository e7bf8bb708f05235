//! Pool backends
//!
//! [`CommandPool`] is what the instrumented pool delegates to. It is
//! implemented for `deadpool_redis::Pool`; tests and embedders can supply
//! their own.

use async_trait::async_trait;
use redis::{Cmd, FromRedisValue, Pipeline};
use std::sync::Arc;

/// A pool that can run single commands and pipelines
#[async_trait]
pub trait CommandPool: Send + Sync {
    /// Error type reported by the pool, returned to callers unchanged
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run one command on a pooled connection
    async fn query_cmd<T>(&self, cmd: &Cmd) -> Result<T, Self::Error>
    where
        T: FromRedisValue + Send;

    /// Run a pipeline as one round-trip on a pooled connection
    async fn query_pipeline<T>(&self, pipeline: &Pipeline) -> Result<T, Self::Error>
    where
        T: FromRedisValue + Send;
}

#[async_trait]
impl CommandPool for deadpool_redis::Pool {
    type Error = deadpool_redis::PoolError;

    async fn query_cmd<T>(&self, cmd: &Cmd) -> Result<T, Self::Error>
    where
        T: FromRedisValue + Send,
    {
        let mut conn = self.get().await?;
        Ok(cmd.query_async(&mut conn).await?)
    }

    async fn query_pipeline<T>(&self, pipeline: &Pipeline) -> Result<T, Self::Error>
    where
        T: FromRedisValue + Send,
    {
        let mut conn = self.get().await?;
        Ok(pipeline.query_async(&mut conn).await?)
    }
}

#[async_trait]
impl<P: CommandPool> CommandPool for Arc<P> {
    type Error = P::Error;

    async fn query_cmd<T>(&self, cmd: &Cmd) -> Result<T, Self::Error>
    where
        T: FromRedisValue + Send,
    {
        (**self).query_cmd(cmd).await
    }

    async fn query_pipeline<T>(&self, pipeline: &Pipeline) -> Result<T, Self::Error>
    where
        T: FromRedisValue + Send,
    {
        (**self).query_pipeline(pipeline).await
    }
}
