// auth/policy.rs - Per-action authorization rules
//
// Every protected handler asks `authorize` before touching a record, so the
// whole rule table lives here.

use crate::error::ApiError;
use crate::middleware::AuthUser;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    RequestProductDeletion,
    ListFlaggedProducts,
    ListProductsByCreator,
    ListUsers,
    Checkout,
    ViewOrders,
}

enum Rule {
    Authenticated,
    OwnerOrAdmin,
}

impl Action {
    fn rule(self) -> Rule {
        match self {
            Action::UpdateProduct | Action::DeleteProduct | Action::ViewOrders => Rule::OwnerOrAdmin,
            Action::CreateProduct
            | Action::RequestProductDeletion
            | Action::ListFlaggedProducts
            | Action::ListProductsByCreator
            | Action::ListUsers
            | Action::Checkout => Rule::Authenticated,
        }
    }

    fn denial(self) -> &'static str {
        match self {
            Action::ViewOrders => "Access denied",
            Action::UpdateProduct | Action::DeleteProduct => "Forbidden. You do not own this product.",
            _ => "Forbidden",
        }
    }
}

/// Decide whether `caller` may perform `action` on a record owned by `owner`.
///
/// `owner` is `None` when the target has no owner reference; owner-gated
/// actions then fall back to admin only.
pub fn authorize(caller: &AuthUser, action: Action, owner: Option<i64>) -> Result<(), ApiError> {
    let allowed = match action.rule() {
        Rule::Authenticated => true,
        Rule::OwnerOrAdmin => caller.is_admin() || owner == Some(caller.id),
    };

    if allowed {
        Ok(())
    } else {
        tracing::warn!(
            "Authorization denied: user {} ({}) attempted {:?} on record owned by {:?}",
            caller.id,
            caller.role,
            action,
            owner
        );
        Err(ApiError::forbidden(action.denial()))
    }
}
