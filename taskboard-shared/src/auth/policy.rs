/// Access policy: role-or-ownership decisions
///
/// One predicate decides every resource-scoped operation: a caller may act
/// on a task iff they hold the `admin` role or they own it. The handlers for
/// get, update, and delete all call [`require_access`]; list operations
/// instead filter at the query (`Task::list_all` vs `Task::list_by_owner`)
/// so non-admins never see other owners' rows at all.
///
/// These checks are pure: no I/O, the role already rides in the token.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::middleware::AuthContext;
/// use taskboard_shared::auth::policy::can_access;
/// use taskboard_shared::models::user::Role;
/// use uuid::Uuid;
///
/// let owner = Uuid::new_v4();
/// let caller = AuthContext { user_id: owner, role: Role::User };
///
/// assert!(can_access(owner, &caller));
/// assert!(!can_access(Uuid::new_v4(), &caller));
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::user::Role;

/// Error type for access policy checks
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// Caller is neither the resource owner nor an admin
    #[error("not the resource owner")]
    NotOwner,

    /// Caller does not hold the required role
    #[error("requires the {} role", .0.as_str())]
    MissingRole(Role),
}

/// Whether `caller` may read, update, or delete a resource owned by `owner_id`
///
/// True iff the caller is an admin or the owner.
pub fn can_access(owner_id: Uuid, caller: &AuthContext) -> bool {
    caller.role == Role::Admin || caller.user_id == owner_id
}

/// Requires role-or-ownership access to a resource
///
/// # Errors
///
/// Returns `PolicyError::NotOwner` (mapped to 403 by the API layer) when
/// [`can_access`] is false.
pub fn require_access(owner_id: Uuid, caller: &AuthContext) -> Result<(), PolicyError> {
    if can_access(owner_id, caller) {
        return Ok(());
    }

    Err(PolicyError::NotOwner)
}

/// Requires the caller to hold a specific role
///
/// # Errors
///
/// Returns `PolicyError::MissingRole` when the caller's role differs.
pub fn require_role(caller: &AuthContext, role: Role) -> Result<(), PolicyError> {
    if caller.role == role {
        return Ok(());
    }

    Err(PolicyError::MissingRole(role))
}
