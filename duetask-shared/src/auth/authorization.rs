/// Ownership checks for per-user resources
///
/// Every to-do belongs to exactly one user and that owner never changes. Any
/// operation that reads or mutates a specific to-do on behalf of a caller must
/// pass through [`require_owner`] first.
///
/// # Example
///
/// ```
/// use duetask_shared::auth::authorization::{require_owner, AuthzError};
///
/// assert!(require_owner(7, 7).is_ok());
/// assert!(matches!(require_owner(7, 8), Err(AuthzError::NotOwner { .. })));
/// ```

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller does not own the resource
    #[error("User {caller} does not own this resource")]
    NotOwner { caller: i64 },
}

/// Anything owned by a single user
pub trait Owned {
    fn owner_id(&self) -> i64;
}

/// Checks that `caller` is the owner recorded on a resource
pub fn require_owner(owner_id: i64, caller: i64) -> Result<(), AuthzError> {
    if owner_id == caller {
        Ok(())
    } else {
        tracing::warn!(owner_id, caller, "Rejected access to resource owned by another user");
        Err(AuthzError::NotOwner { caller })
    }
}

/// Checks ownership of an [`Owned`] resource
pub fn require_ownership<T: Owned>(resource: &T, caller: i64) -> Result<(), AuthzError> {
    require_owner(resource.owner_id(), caller)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note(i64);

    impl Owned for Note {
        fn owner_id(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn test_owner_is_allowed() {
        assert_eq!(require_owner(1, 1), Ok(()));
        assert!(require_ownership(&Note(5), 5).is_ok());
    }

    #[test]
    fn test_other_user_is_rejected() {
        assert_eq!(
            require_owner(1, 2),
            Err(AuthzError::NotOwner { caller: 2 })
        );
        assert!(require_ownership(&Note(5), 6).is_err());
    }
}
