//! Expense Model

use serde::{Deserialize, Serialize};

use super::actor::Actor;

/// Operating expense record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    /// Expense date (Unix millis)
    pub date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_by: Actor,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create expense payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCreate {
    pub name: String,
    pub amount: f64,
    /// "YYYY-MM-DD"
    pub date: String,
    pub note: Option<String>,
}

/// Update expense payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseUpdate {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
    pub note: Option<String>,
}
