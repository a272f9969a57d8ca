//! Cross-cutting concerns: error types, logging, role gates

pub mod error;
pub mod logger;

use crate::common::error::{CoreError, CoreResult};
use shared::auth::{Principal, Role};

/// Role gate for operations restricted to MANAGER or ADMIN.
pub(crate) fn require_elevated(principal: &Principal) -> CoreResult<()> {
    if principal.is_elevated() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "requires MANAGER or ADMIN role".to_string(),
        ))
    }
}

/// Role gate for ADMIN-only operations (catalog management).
pub(crate) fn require_admin(principal: &Principal) -> CoreResult<()> {
    if principal.has_role(Role::Admin) {
        Ok(())
    } else {
        Err(CoreError::Forbidden("requires ADMIN role".to_string()))
    }
}
