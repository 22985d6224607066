use stockbook_auth::{JwtClaims, Principal, Role};
use stockbook_core::{BranchId, UserId};

/// Principal context for a request (authenticated identity + role).
///
/// Inserted by the auth middleware; immutable for the request's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self {
            principal: Principal::from_claims(claims),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }

    pub fn branch_id(&self) -> Option<BranchId> {
        self.principal.branch_id
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}
