//! Test doubles
//!
//! [`MockPool`] is an in-process [`CommandPool`] that answers from a queue of
//! scripted replies and remembers every packed command and pipeline it was
//! asked to run.

use crate::backend::CommandPool;
use async_trait::async_trait;
use redis::{Cmd, FromRedisValue, Pipeline, Value};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors produced by [`MockPool`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MockError {
    /// Scripted failure
    #[error("injected failure: {0}")]
    Injected(String),

    /// Scripted reply did not decode into the requested type
    #[error("decode failure: {0}")]
    Decode(String),
}

/// Scripted command pool
#[derive(Debug, Default)]
pub struct MockPool {
    replies: Mutex<VecDeque<Result<Value, MockError>>>,
    commands: Mutex<Vec<Vec<u8>>>,
    pipelines: Mutex<Vec<Vec<u8>>>,
}

impl MockPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn push_ok(&self, value: Value) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(value));
    }

    /// Queue a failure
    pub fn push_err(&self, error: MockError) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
    }

    /// Packed single commands received, in order
    pub fn received_commands(&self) -> Vec<Vec<u8>> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Packed pipelines received, in order
    pub fn received_pipelines(&self) -> Vec<Vec<u8>> {
        self.pipelines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Next scripted reply; `OK` once the script runs out
    fn next_reply<T: FromRedisValue>(&self) -> Result<T, MockError> {
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Ok(Value::Okay))?;
        redis::from_redis_value(&reply).map_err(|e| MockError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CommandPool for MockPool {
    type Error = MockError;

    async fn query_cmd<T>(&self, cmd: &Cmd) -> Result<T, Self::Error>
    where
        T: FromRedisValue + Send,
    {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cmd.get_packed_command());
        self.next_reply()
    }

    async fn query_pipeline<T>(&self, pipeline: &Pipeline) -> Result<T, Self::Error>
    where
        T: FromRedisValue + Send,
    {
        self.pipelines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(pipeline.get_packed_pipeline());
        self.next_reply()
    }
}
