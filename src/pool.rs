use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::sync::{Notify, Semaphore, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::PoolError;
use crate::models::pool_config::PoolConfig;
use crate::models::pool_stats::PoolStats;
use crate::pooled::PooledConnection;
use crate::reaper;
use crate::udbc::factory::ConnectionFactory;

/// The shared mutable pool state. A connection is in exactly one of the two
/// sets, or it has been destroyed and is in neither; `idle`, `leased` and
/// `closed` are only ever touched while holding the one mutex in
/// [`PoolInner::sets`].
pub(crate) struct PoolSets {
    /// Most-recently-idle connections at the back.
    pub(crate) idle: VecDeque<Arc<PooledConnection>>,
    pub(crate) leased: Vec<Arc<PooledConnection>>,
    pub(crate) closed: bool,
}

pub(crate) struct PoolInner {
    pub(crate) config: PoolConfig,
    pub(crate) factory: Arc<dyn ConnectionFactory>,
    pub(crate) sets: Mutex<PoolSets>,
    /// Bounds outstanding leases at `max_size`.
    pub(crate) semaphore: Arc<Semaphore>,
    pub(crate) reaper_wake: Notify,
    waiting: AtomicUsize,
}

impl PoolInner {
    /// Move a handle from the leased set back into the idle set, waking the
    /// reaper when the idle set rises above the warm floor.
    pub(crate) fn return_connection(&self, conn: &PooledConnection) {
        let wake = {
            let mut sets = self.sets.lock();
            if sets.closed {
                return;
            }
            let Some(pos) = sets
                .leased
                .iter()
                .position(|c| std::ptr::eq(Arc::as_ptr(c), conn))
            else {
                return;
            };
            let handle = sets.leased.swap_remove(pos);
            sets.idle.push_back(handle);
            sets.idle.len() > self.config.min_size()
        };
        if wake {
            self.reaper_wake.notify_one();
        }
    }

    /// Physically close a connection. Idempotent; close failures are logged
    /// and swallowed.
    pub(crate) async fn destroy(&self, conn: Arc<PooledConnection>) {
        if !conn.mark_destroyed() {
            return;
        }
        if let Err(e) = conn.raw().close().await {
            warn!("Exception close connections: {e}");
        }
    }
}

/// A bounded database connection pool.
///
/// `min_size` connections are opened eagerly at construction. `acquire`
/// prefers the most recently idled connection and grows on demand up to
/// `max_size`; beyond that it waits at most `max_wait` for a release. A
/// background reaper trims idle connections above `min_size` over time.
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
    shutdown_tx: watch::Sender<bool>,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionPool {
    /// Create a pool and eagerly open `min_size` connections.
    ///
    /// Fails with [`PoolError::Initialization`] if any eager open fails;
    /// connections created before the failure are closed again, a partial
    /// pool is never left behind.
    pub async fn new<F: ConnectionFactory>(
        factory: F,
        config: PoolConfig,
    ) -> Result<Self, PoolError> {
        config.validate()?;
        let inner = Arc::new(PoolInner {
            semaphore: Arc::new(Semaphore::new(config.max_size())),
            config,
            factory: Arc::new(factory),
            sets: Mutex::new(PoolSets {
                idle: VecDeque::new(),
                leased: Vec::new(),
                closed: false,
            }),
            reaper_wake: Notify::new(),
            waiting: AtomicUsize::new(0),
        });

        for _ in 0..inner.config.min_size() {
            match inner.factory.create().await {
                Ok(conn) => {
                    let pooled = Arc::new(PooledConnection::new(conn, Arc::downgrade(&inner)));
                    inner.sets.lock().idle.push_back(pooled);
                }
                Err(e) => {
                    let created: Vec<_> = inner.sets.lock().idle.drain(..).collect();
                    for conn in created {
                        inner.destroy(conn).await;
                    }
                    return Err(PoolError::Initialization(Box::new(e)));
                }
            }
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let reaper = tokio::spawn(reaper::run(inner.clone(), shutdown_rx));
        debug!(
            min_size = inner.config.min_size(),
            max_size = inner.config.max_size(),
            "connection pool ready"
        );
        Ok(Self {
            inner,
            shutdown_tx,
            reaper: Mutex::new(Some(reaper)),
        })
    }

    /// Borrow a connection, waiting at most `max_wait` for capacity.
    ///
    /// The most recently idled connection is reused when one validates;
    /// otherwise a new one is opened through the factory, whose errors
    /// propagate to the caller.
    pub async fn acquire(&self) -> Result<Arc<PooledConnection>, PoolError> {
        if self.is_closed() {
            return Err(PoolError::PoolClosed);
        }

        self.inner.waiting.fetch_add(1, Ordering::SeqCst);
        let acquired = timeout(
            self.inner.config.max_wait(),
            self.inner.semaphore.clone().acquire_owned(),
        )
        .await;
        self.inner.waiting.fetch_sub(1, Ordering::SeqCst);
        let permit = match acquired {
            Ok(Ok(permit)) => permit,
            // Shutdown closed the semaphore while we were waiting.
            Ok(Err(_)) => return Err(PoolError::PoolClosed),
            Err(_) => return Err(PoolError::AcquireTimeout(self.inner.config.max_wait())),
        };

        loop {
            let candidate = {
                let mut sets = self.inner.sets.lock();
                if sets.closed {
                    return Err(PoolError::PoolClosed);
                }
                sets.idle.pop_back()
            };
            let Some(conn) = candidate else { break };
            if self.inner.factory.validate(conn.raw().as_ref()).await {
                conn.lease(permit);
                let mut sets = self.inner.sets.lock();
                if sets.closed {
                    drop(sets);
                    self.inner.destroy(conn).await;
                    return Err(PoolError::PoolClosed);
                }
                sets.leased.push(conn.clone());
                return Ok(conn);
            }
            debug!("discarding unusable idle connection");
            self.inner.destroy(conn).await;
        }

        // Idle set exhausted: grow on demand.
        let conn = self.inner.factory.create().await?;
        let pooled = Arc::new(PooledConnection::new(conn, Arc::downgrade(&self.inner)));
        pooled.lease(permit);
        let mut sets = self.inner.sets.lock();
        if sets.closed {
            drop(sets);
            self.inner.destroy(pooled).await;
            return Err(PoolError::PoolClosed);
        }
        sets.leased.push(pooled.clone());
        drop(sets);
        debug!("opened new connection on demand");
        Ok(pooled)
    }

    /// Return a borrowed connection to the pool.
    ///
    /// Equivalent to [`PooledConnection::release`]; releasing twice is a
    /// no-op.
    pub fn release(&self, conn: &Arc<PooledConnection>) {
        conn.release();
    }

    /// Close the pool and destroy every connection, idle or leased.
    ///
    /// Idempotent and safe to call from any task. Individual close failures
    /// are logged, never propagated.
    pub async fn shutdown(&self) {
        let drained = {
            let mut sets = self.inner.sets.lock();
            if sets.closed {
                return;
            }
            sets.closed = true;
            let mut drained: Vec<_> = sets.idle.drain(..).collect();
            drained.extend(sets.leased.drain(..));
            drained
        };

        // Wake blocked acquires; they fail with PoolClosed.
        self.inner.semaphore.close();

        // Stop the reaper and wait it out before draining, so trimming and
        // draining never run at the same time.
        let _ = self.shutdown_tx.send(true);
        let handle = self.reaper.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        let count = drained.len();
        for conn in drained {
            self.inner.destroy(conn).await;
        }
        info!(connections = count, "connection pool closed");
    }

    /// Returns true once [`shutdown`](ConnectionPool::shutdown) has run.
    pub fn is_closed(&self) -> bool {
        self.inner.sets.lock().closed
    }

    /// Total number of connections, idle and leased.
    pub fn size(&self) -> usize {
        let sets = self.inner.sets.lock();
        sets.idle.len() + sets.leased.len()
    }

    /// Number of connections currently checked out.
    pub fn leased_count(&self) -> usize {
        self.inner.sets.lock().leased.len()
    }

    /// Number of connections available for immediate acquisition.
    pub fn idle_count(&self) -> usize {
        self.inner.sets.lock().idle.len()
    }

    /// Consistent snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        let waiting = self.inner.waiting.load(Ordering::SeqCst);
        let sets = self.inner.sets.lock();
        PoolStats::new(
            sets.idle.len() + sets.leased.len(),
            sets.idle.len(),
            sets.leased.len(),
            waiting,
        )
    }

    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }
}
