use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role carried in the identity provider's token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Business owner: full access.
    Owner,
    /// Cashier: day-to-day stock operations.
    Kasir,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Kasir => "KASIR",
        }
    }

    /// Static role → permission policy.
    pub fn permissions(&self) -> Vec<Permission> {
        match self {
            Role::Owner => vec![Permission::WILDCARD],
            Role::Kasir => vec![
                Permission::STOCK_READ,
                Permission::STOCK_MUTATE,
                Permission::STOCK_TRANSFER,
            ],
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
