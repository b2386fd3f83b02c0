use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::error::PoolError;
use crate::models::pool_config::PoolConfig;
use crate::pool::ConnectionPool;
use crate::udbc::factory::ConnectionFactory;

// 全局单例（Rust 1.80+ 推荐）
pub static DB: LazyLock<PoolManager> = LazyLock::new(PoolManager::new);

/// 数据库连接池管理器
/// Manages database connection pools
pub struct PoolManager {
    pools: DashMap<String, Arc<ConnectionPool>>,
}

/// 获取全局 PoolManager 实例
pub fn pool_mgr() -> &'static PoolManager {
    &DB
}

impl PoolManager {
    pub fn new() -> Self {
        Self {
            pools: DashMap::new(),
        }
    }

    /// 注册数据库连接池
    pub async fn register<F: ConnectionFactory>(
        &self,
        name: &str,
        factory: F,
        config: PoolConfig,
    ) -> Result<(), PoolError> {
        let pool = ConnectionPool::new(factory, config).await?;
        self.pools.insert(name.to_string(), Arc::new(pool));
        Ok(())
    }

    /// 获取命名连接池
    pub fn pool(&self, name: &str) -> Option<Arc<ConnectionPool>> {
        self.pools.get(name).map(|v| v.value().clone())
    }

    /// 关闭并移除所有连接池
    pub async fn shutdown_all(&self) {
        let names: Vec<String> = self.pools.iter().map(|e| e.key().clone()).collect();
        for name in names {
            if let Some((_, pool)) = self.pools.remove(&name) {
                pool.shutdown().await;
            }
        }
    }
}
