//! Gym Server - 健身房管理系统后端
//!
//! # 架构概述
//!
//! 本模块是服务的主入口，提供以下核心功能：
//!
//! - **计费引擎** (`billing`): 会员付费周期推导、分配、冲销与状态机
//! - **数据库** (`db`): 嵌入式 SQLite 存储 (整聚合读写)
//! - **HTTP API** (`api`): RESTful API 接口
//! - **操作人解析** (`auth`): 审计字段的 actor 解析
//!
//! # 模块结构
//!
//! ```text
//! gym-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── billing/       # 计费周期引擎 (核心)
//! ├── api/           # HTTP 路由和处理器
//! ├── auth/          # actor 解析
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod billing;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{ApiResponse, AppError, AppResult};

// Re-export logger functions
pub use crate::utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() {
    dotenv::dotenv().ok();
    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
   ______
  / ____/_  ______ ___
 / / __/ / / / __ `__ \
/ /_/ / /_/ / / / / / /
\____/\__, /_/ /_/ /_/
     /____/
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}
