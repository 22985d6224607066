use serde::{Deserialize, Serialize};

use stockbook_core::BranchId;

/// A physical or logical inventory location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    /// Short unique code, e.g. "PST".
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub is_active: bool,
}

impl Branch {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: BranchId::new(),
            code: code.into(),
            name: name.into(),
            address: None,
            is_active: true,
        }
    }
}
