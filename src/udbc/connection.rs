use async_trait::async_trait;

use crate::error::PoolError;

/// A physical database connection owned by the pool.
///
/// The query surface lives on the concrete driver type; the pool only cares
/// about the lifecycle boundary.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Close the underlying physical connection.
    async fn close(&self) -> Result<(), PoolError>;

    /// Whether the physical connection is still usable.
    fn is_usable(&self) -> bool;
}
