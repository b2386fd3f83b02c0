use async_trait::async_trait;
use mysql_async::Conn;
use tokio::sync::Mutex;

use crate::error::PoolError;
use crate::udbc::connection::Connection;

pub struct MysqlConnection {
    // disconnect() consumes the Conn, so the slot is empty after close.
    conn: Mutex<Option<Conn>>,
}

impl MysqlConnection {
    pub fn new(conn: Conn) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Exclusive access to the underlying driver connection.
    pub fn conn(&self) -> &Mutex<Option<Conn>> {
        &self.conn
    }
}

#[async_trait]
impl Connection for MysqlConnection {
    async fn close(&self) -> Result<(), PoolError> {
        let conn = self.conn.lock().await.take();
        match conn {
            Some(conn) => conn
                .disconnect()
                .await
                .map_err(|e| PoolError::ResourceDestroy(e.to_string())),
            None => Ok(()),
        }
    }

    fn is_usable(&self) -> bool {
        // A connection busy serving a caller counts as usable.
        match self.conn.try_lock() {
            Ok(guard) => guard.is_some(),
            Err(_) => true,
        }
    }
}
