/// Account operations: register, authenticate, attach a push subscription
///
/// Password hashing and verification are CPU and memory heavy, so both run on
/// tokio's blocking pool rather than on a request worker.
///
/// # Example
///
/// ```no_run
/// use duetask_shared::auth::password::PasswordParams;
/// use duetask_shared::services::accounts::{authenticate, register, Registration};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let params = PasswordParams::default();
/// let ada = register(&pool, Registration::new("Ada", "ada@x.com", "pw"), None, &params).await?;
///
/// let again = authenticate(&pool, "ADA@x.com", "pw").await?;
/// assert_eq!(again.id, ada.id);
/// # Ok(())
/// # }
/// ```

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, info};
use validator::Validate;

use crate::{
    auth::password::{self, PasswordParams},
    models::{
        subscription::PushSubscription,
        user::{CreateUser, User},
    },
    services::error::{ServiceError, ServiceResult},
};

/// Unique constraint guarding `users.email`
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// Sign-up input as typed into the form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

impl Registration {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }
}

/// Registers a new user, optionally attaching a push subscription
///
/// # Errors
///
/// - `ServiceError::Validation` for a blank name, malformed email or empty password
/// - `ServiceError::DuplicateEmail` when the email is taken; no user is created
pub async fn register(
    pool: &PgPool,
    registration: Registration,
    subscription: Option<PushSubscription>,
    params: &PasswordParams,
) -> ServiceResult<User> {
    let registration = registration.normalized();
    registration
        .validate()
        .map_err(ServiceError::from_validation)?;

    // Cheap early exit; the unique constraint below is what actually decides
    if User::find_by_email(pool, &registration.email).await?.is_some() {
        debug!(email = %registration.email, "Sign-up for an existing email");
        return Err(ServiceError::DuplicateEmail);
    }

    let password_hash = hash_blocking(registration.password, *params).await?;

    let user = User::create(
        pool,
        CreateUser {
            name: registration.name,
            email: registration.email,
            password_hash,
            subscription,
        },
    )
    .await
    .map_err(|e| {
        if is_duplicate_email(&e) {
            ServiceError::DuplicateEmail
        } else {
            ServiceError::Database(e)
        }
    })?;

    info!(
        user_id = user.id,
        push = user.subscription().is_some(),
        "User registered"
    );
    Ok(user)
}

/// Checks an email and password pair
///
/// # Errors
///
/// - `ServiceError::NoSuchAccount` when nobody registered the email
/// - `ServiceError::InvalidPassword` when the password does not match
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> ServiceResult<User> {
    let user = User::find_by_email(pool, email)
        .await?
        .ok_or(ServiceError::NoSuchAccount)?;

    let hash = user.password_hash.clone();
    let password = password.to_string();
    let valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| ServiceError::Internal(format!("Password verification task failed: {}", e)))??;

    if !valid {
        debug!(user_id = user.id, "Login with wrong password");
        return Err(ServiceError::InvalidPassword);
    }

    info!(user_id = user.id, "User authenticated");
    Ok(user)
}

/// Attaches or replaces a user's push subscription
///
/// # Errors
///
/// - `ServiceError::Validation` for an unusable descriptor
/// - `ServiceError::NoSuchAccount` if the user no longer exists
pub async fn attach_subscription(
    pool: &PgPool,
    user_id: i64,
    subscription: &PushSubscription,
) -> ServiceResult<()> {
    subscription
        .validate()
        .map_err(|e| ServiceError::validation("subscription", e.to_string()))?;

    if !User::update_subscription(pool, user_id, subscription).await? {
        return Err(ServiceError::NoSuchAccount);
    }

    info!(user_id, "Push subscription attached");
    Ok(())
}

async fn hash_blocking(password: String, params: PasswordParams) -> ServiceResult<String> {
    let hash = tokio::task::spawn_blocking(move || password::hash_password_with(&password, &params))
        .await
        .map_err(|e| ServiceError::Internal(format!("Password hashing task failed: {}", e)))??;
    Ok(hash)
}

fn is_duplicate_email(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_err) => db_err
            .constraint()
            .map(|c| c == EMAIL_UNIQUE_CONSTRAINT)
            .unwrap_or(false),
        _ => false,
    }
}
