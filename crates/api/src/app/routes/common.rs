use std::str::FromStr;

use axum::extract::rejection::{JsonRejection, QueryRejection};

use stockbook_auth::{CommandAuthorization, Permission};

use crate::app::errors;

/// Small helper wrapper to associate required permissions with a command.
pub struct CmdAuth<C> {
    pub inner: C,
    pub required: Vec<Permission>,
}

impl<C> CmdAuth<C> {
    pub fn new(inner: C, permission: Permission) -> Self {
        Self {
            inner,
            required: vec![permission],
        }
    }
}

impl<C> CommandAuthorization for CmdAuth<C> {
    fn required_permissions(&self) -> &[Permission] {
        &self.required
    }
}

/// Parse a required id parameter, reporting `what` on failure.
pub fn parse_id<T: FromStr>(raw: Option<&str>, what: &str) -> Result<T, axum::response::Response> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| errors::validation_error(format!("{what} required")))?;
    raw.parse()
        .map_err(|_| errors::validation_error(format!("{what} is not a valid id")))
}

/// Parse an optional id parameter; blank counts as absent.
pub fn parse_optional_id<T: FromStr>(
    raw: Option<&str>,
    what: &str,
) -> Result<Option<T>, axum::response::Response> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(_) => parse_id(raw, what).map(Some),
    }
}

/// Parse a `limit` query value. Out-of-range values are clamped by the services.
pub fn parse_limit(raw: Option<&str>) -> Result<Option<usize>, axum::response::Response> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<usize>()
            .map(Some)
            .map_err(|_| errors::validation_error("limit must be a non-negative integer")),
    }
}

pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    errors::validation_error(rejection.body_text())
}

pub fn query_rejection(rejection: QueryRejection) -> axum::response::Response {
    errors::validation_error(rejection.body_text())
}
