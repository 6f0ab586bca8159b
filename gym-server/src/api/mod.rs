//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`members`] - 会员管理 + 计费周期操作
//! - [`expenses`] - 支出管理
//! - [`inquiries`] - 咨询/线索管理

pub mod expenses;
pub mod health;
pub mod inquiries;
pub mod members;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};
