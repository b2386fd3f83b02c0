use std::time::Duration;

use thiserror::Error;

/// Represents errors that can occur in the pool module.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Initialization error: {0}")]
    Initialization(#[source] Box<PoolError>),
    #[error("Acquire timeout: no connection available within {0:?}")]
    AcquireTimeout(Duration),
    #[error("Connection pool closed")]
    PoolClosed,
    #[error("No operations allowed after connection released to the pool")]
    UseAfterRelease,
    #[error("Destroy error: {0}")]
    ResourceDestroy(String),
    #[error("Connection error: {0}")]
    Connection(String),
}

#[cfg(feature = "mysql")]
impl From<mysql_async::Error> for PoolError {
    fn from(e: mysql_async::Error) -> Self {
        PoolError::Connection(e.to_string())
    }
}
