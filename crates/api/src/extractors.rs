//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use inkwell_common::AppError;
use inkwell_db::entities::user::{self, Role};

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Reject users whose role ranks below `required`.
pub fn require_role(user: &user::Model, required: Role) -> Result<(), AppError> {
    if user.role.satisfies(required) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("Requires role {required:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_db::test_utils::fixtures;

    #[test]
    fn test_require_role() {
        let user = fixtures::user_with_role("u1", Role::User);
        let admin_one = fixtures::user_with_role("a1", Role::AdminLevelOne);
        let admin_two = fixtures::user_with_role("a2", Role::AdminLevelTwo);

        assert!(require_role(&user, Role::User).is_ok());
        assert!(matches!(
            require_role(&user, Role::AdminLevelOne),
            Err(AppError::Forbidden(_))
        ));
        assert!(require_role(&admin_one, Role::AdminLevelOne).is_ok());
        assert!(require_role(&admin_one, Role::AdminLevelTwo).is_err());
        assert!(require_role(&admin_two, Role::AdminLevelOne).is_ok());
    }
}
