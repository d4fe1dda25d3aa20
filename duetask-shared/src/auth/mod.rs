/// Authentication and authorization primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session`]: signed session and pending-subscription tokens
/// - [`authorization`]: per-user ownership checks
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, per-record salt, tunable work factor
/// - **Sessions**: HS256-signed tokens carried in HttpOnly cookies
/// - **Constant-time Comparison**: password verification never short-circuits
///
/// # Example
///
/// ```no_run
/// use duetask_shared::auth::password::{hash_password, verify_password};
/// use duetask_shared::auth::session::{create_session_token, SessionClaims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_session_token(&SessionClaims::new(1, "Ada"), "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod password;
pub mod session;
