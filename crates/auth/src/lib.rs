//! `stockbook-auth` — pure authentication/authorization boundary.
//!
//! Tokens are issued by an external identity provider; this crate only verifies
//! them and answers "may this principal run this operation?". It is decoupled
//! from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, CommandAuthorization, authorize};
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
