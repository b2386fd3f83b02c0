use serde::{Deserialize, Serialize};

/// A consistent snapshot of the pool counters.
///
/// `idle` and `leased` are read under the pool's own synchronization, so a
/// connection is never counted in both or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    total: usize,
    idle: usize,
    leased: usize,
    waiting: usize,
}

impl PoolStats {
    pub fn new(total: usize, idle: usize, leased: usize, waiting: usize) -> Self {
        Self {
            total,
            idle,
            leased,
            waiting,
        }
    }

    /// Total number of connections, idle and leased.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Connections available for immediate acquisition.
    pub fn idle(&self) -> usize {
        self.idle
    }

    /// Connections currently checked out to callers.
    pub fn leased(&self) -> usize {
        self.leased
    }

    /// Acquire calls currently waiting for capacity.
    pub fn waiting(&self) -> usize {
        self.waiting
    }

    /// Leased share of the pool, 0.0 to 1.0. Returns 0.0 for an empty pool.
    pub fn utilization(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.leased as f64 / self.total as f64
        }
    }

    /// Whether every connection is currently leased.
    pub fn is_full(&self) -> bool {
        self.idle == 0 && self.total > 0
    }
}

impl Default for PoolStats {
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}
