use serde::{Deserialize, Serialize};

use stockbook_core::{BranchId, UserId};

use crate::{JwtClaims, Permission, Role};

/// A verified identity acting on the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    /// Home branch for cashiers; owners usually have none.
    pub branch_id: Option<BranchId>,
}

impl Principal {
    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            branch_id: claims.branch_id,
        }
    }

    pub fn permissions(&self) -> Vec<Permission> {
        self.role.permissions()
    }
}
