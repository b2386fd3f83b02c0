use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::OwnedSemaphorePermit;

use crate::error::PoolError;
use crate::pool::PoolInner;
use crate::udbc::connection::Connection;

/// A pooled connection handle.
///
/// Exactly one `PooledConnection` wraps a given physical connection for its
/// entire lifetime. The pool hands the same instance back out on re-acquire
/// with the released flag reset, so a handle kept around after [`release`]
/// becomes usable again once it has been re-acquired.
///
/// [`release`]: PooledConnection::release
pub struct PooledConnection {
    conn: Arc<dyn Connection>,
    /// True whenever the handle sits in the idle set.
    released: AtomicBool,
    /// Physical destruction already happened (reaper, shutdown or a failed
    /// validation).
    destroyed: AtomicBool,
    /// Capacity permit held while leased.
    permit: Mutex<Option<OwnedSemaphorePermit>>,
    pool: Weak<PoolInner>,
}

impl PooledConnection {
    pub(crate) fn new(conn: Arc<dyn Connection>, pool: Weak<PoolInner>) -> Self {
        Self {
            conn,
            released: AtomicBool::new(true),
            destroyed: AtomicBool::new(false),
            permit: Mutex::new(None),
            pool,
        }
    }

    /// Access the underlying connection.
    pub fn connection(&self) -> Result<Arc<dyn Connection>, PoolError> {
        self.check_released()?;
        Ok(self.conn.clone())
    }

    /// Whether the underlying physical connection is still usable.
    pub fn is_usable(&self) -> Result<bool, PoolError> {
        self.check_released()?;
        Ok(self.conn.is_usable())
    }

    /// Return this connection to its pool.
    ///
    /// Releasing twice is safe; the second call is a no-op.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        // The permit leaves the slot before the idle push and is dropped
        // after it, so a woken waiter always finds this connection idle.
        let permit = self.permit.lock().take();
        if let Some(pool) = self.pool.upgrade() {
            pool.return_connection(self);
        }
        drop(permit);
    }

    pub(crate) fn lease(&self, permit: OwnedSemaphorePermit) {
        *self.permit.lock() = Some(permit);
        self.released.store(false, Ordering::SeqCst);
    }

    pub(crate) fn raw(&self) -> &Arc<dyn Connection> {
        &self.conn
    }

    /// First caller gets `true` and owns the physical close.
    pub(crate) fn mark_destroyed(&self) -> bool {
        !self.destroyed.swap(true, Ordering::SeqCst)
    }

    fn check_released(&self) -> Result<(), PoolError> {
        if self.released.load(Ordering::SeqCst) {
            return Err(PoolError::UseAfterRelease);
        }
        Ok(())
    }
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("released", &self.released.load(Ordering::SeqCst))
            .field("destroyed", &self.destroyed.load(Ordering::SeqCst))
            .finish()
    }
}
