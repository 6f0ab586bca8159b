//! Shared types for the gym management backend
//!
//! Common types used across crates: data models, DTOs, the unified
//! error system and small utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
