use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PoolError;

/// 连接池配置
/// Sizing and timeout configuration for a [`ConnectionPool`].
///
/// [`ConnectionPool`]: crate::pool::ConnectionPool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    min_size: usize,      // 池最小连接数，构建时预热
    max_size: usize,      // 池最大连接数
    max_wait_ms: u64,     // 获取连接的最长等待时间
    idle_timeout_ms: u64, // 空闲回收线程的休眠间隔
}

impl PoolConfig {
    /// Create a configuration with the given pool bounds.
    ///
    /// Fails with [`PoolError::Configuration`] unless
    /// `1 <= min_size <= max_size`.
    pub fn new(min_size: usize, max_size: usize) -> Result<Self, PoolError> {
        let config = Self {
            min_size,
            max_size,
            max_wait_ms: 30_000,
            idle_timeout_ms: 60_000,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_wait_ms(mut self, max_wait_ms: u64) -> Self {
        self.max_wait_ms = max_wait_ms;
        self
    }

    pub fn with_idle_timeout_ms(mut self, idle_timeout_ms: u64) -> Self {
        self.idle_timeout_ms = idle_timeout_ms;
        self
    }

    /// Re-checked at pool construction; the builder methods do not validate.
    pub(crate) fn validate(&self) -> Result<(), PoolError> {
        if self.min_size > self.max_size || self.min_size < 1 || self.max_size < 1 {
            return Err(PoolError::Configuration(format!(
                "Invalid pool size parameters: min_size={}, max_size={}",
                self.min_size, self.max_size
            )));
        }
        if self.max_wait_ms < 1 {
            return Err(PoolError::Configuration(
                "Invalid pool size parameters: max_wait_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}
