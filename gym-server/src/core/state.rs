use std::sync::Arc;

use dashmap::DashMap;
use sqlx::SqlitePool;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core::Config;
use crate::db::DbService;

/// 服务器状态 - 持有配置、数据库连接池和每会员写锁
///
/// 使用 Arc/Clone 实现浅拷贝，所有权成本极低。
///
/// # 每会员写锁
///
/// 每个 API 调用加载一个 Member 聚合、在内存中变更、整体写回。
/// 两个并发支付在同一会员上会交错 read-modify-write，因此所有
/// 变更端点在 load–mutate–save 区间内持有该会员的锁。
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 每会员互斥锁 (member id → lock)
    member_locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        Self {
            config,
            pool,
            member_locks: Arc::new(DashMap::new()),
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 确保工作目录存在
    /// 2. 初始化数据库 (work_dir/database/gym.db)
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        let db_path = config.database_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create database directory");
        }

        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        Self::new(config.clone(), db_service.pool)
    }

    /// 获取指定会员的写锁，序列化该聚合上的并发变更
    pub async fn lock_member(&self, member_id: i64) -> OwnedMutexGuard<()> {
        let lock = self
            .member_locks
            .entry(member_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
