//! Group-based authorization for back-office routes.

use axum::http::StatusCode;

use crate::context::PrincipalContext;

/// Back-office routes are reserved for members of the admin group.
pub fn require_group(principal: &PrincipalContext, group: &str) -> Result<(), StatusCode> {
    if principal.in_group(group) {
        Ok(())
    } else {
        tracing::debug!(subject = principal.subject(), group, "caller lacks required group");
        Err(StatusCode::FORBIDDEN)
    }
}
