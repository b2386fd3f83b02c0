use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::pool::PoolInner;

/// Background task that trims idle connections above the pool's warm floor.
///
/// Sleeps until a release pushes the idle set above `min_size`, then
/// destroys one oldest-idle connection per `idle_timeout` tick until the set
/// is back at the floor. The shutdown signal cancels a pending sleep
/// immediately; trimming never overlaps the pool's own drain.
pub(crate) async fn run(inner: Arc<PoolInner>, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = inner.reaper_wake.notified() => {}
        }
        loop {
            tokio::select! {
                _ = shutdown.changed() => return,
                _ = tokio::time::sleep(inner.config.idle_timeout()) => {}
            }
            let victim = {
                let mut sets = inner.sets.lock();
                if sets.closed || sets.idle.len() <= inner.config.min_size() {
                    None
                } else {
                    // Oldest idle connection sits at the front.
                    sets.idle.pop_front()
                }
            };
            match victim {
                Some(conn) => {
                    debug!("reaping idle connection");
                    inner.destroy(conn).await;
                }
                None => break,
            }
        }
    }
    debug!("reaper stopped");
}
