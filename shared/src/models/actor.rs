//! Acting-user stamp attached to audited records

use serde::{Deserialize, Serialize};

/// Who performed an operation. Resolved by the auth layer; every mutating
/// endpoint stamps `created_by` / `updated_by` / `by` fields with this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Staff user id, `None` for unattended/system operations
    pub id: Option<i64>,
    /// Display name
    pub name: String,
}

impl Actor {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    /// Fallback actor when no authenticated user is attached to the request
    pub fn system() -> Self {
        Self {
            id: None,
            name: "System".to_string(),
        }
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::system()
    }
}
