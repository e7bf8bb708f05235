use thiserror::Error;

/// Failure to construct an [`InstrumentedPool`](crate::InstrumentedPool).
///
/// Both variants display exactly as the underlying error does.
#[derive(Error, Debug)]
pub enum ConstructError {
    /// The address could not be parsed into a Redis connection target
    #[error(transparent)]
    InvalidAddress(#[from] redis::RedisError),

    /// The underlying pool refused the configuration
    #[error(transparent)]
    CreatePool(#[from] deadpool_redis::CreatePoolError),
}
