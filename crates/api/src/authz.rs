//! API-side authorization guard for commands and queries.
//!
//! Enforced at the HTTP boundary before any service is called, keeping the
//! services themselves auth-agnostic.

use stockbook_auth::{AuthzError, CommandAuthorization, authorize};

use crate::context::PrincipalContext;

/// Check every permission the command requires for the current principal.
pub fn authorize_command<C: CommandAuthorization>(
    principal: &PrincipalContext,
    command: &C,
) -> Result<(), AuthzError> {
    for perm in command.required_permissions() {
        authorize(principal.principal(), perm)?;
    }
    Ok(())
}
