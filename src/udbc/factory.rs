use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PoolError;
use crate::udbc::connection::Connection;

/// Creates physical connections for a pool.
#[async_trait]
pub trait ConnectionFactory: Send + Sync + 'static {
    /// Open a new physical connection.
    async fn create(&self) -> Result<Arc<dyn Connection>, PoolError>;

    /// Validate an idle connection before it is handed back out.
    async fn validate(&self, conn: &dyn Connection) -> bool {
        conn.is_usable()
    }
}

#[async_trait]
impl<T: ConnectionFactory> ConnectionFactory for Arc<T> {
    async fn create(&self) -> Result<Arc<dyn Connection>, PoolError> {
        (**self).create().await
    }

    async fn validate(&self, conn: &dyn Connection) -> bool {
        (**self).validate(conn).await
    }
}
