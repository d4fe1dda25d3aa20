/// User model and database operations
///
/// Users are the credential store: identity, Argon2id password hash, and at
/// most one browser push subscription. Users are created at sign-up and only
/// ever mutated to attach or replace their subscription.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     name TEXT NOT NULL,
///     email TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     push_endpoint TEXT,
///     push_p256dh TEXT,
///     push_auth TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use duetask_shared::models::user::{User, CreateUser};
/// use duetask_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     name: "Ada".to_string(),
///     email: "ada@x.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     subscription: None,
/// }).await?;
///
/// let found = User::find_by_email(&pool, "ADA@x.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::subscription::PushSubscription;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,

    /// Display name, used in notification text
    pub name: String,

    /// Normalized (trimmed, lower-case) email, unique across all users
    pub email: String,

    /// Argon2id PHC string, never plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub push_endpoint: Option<String>,
    pub push_p256dh: Option<String>,
    pub push_auth: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,

    /// Email as typed; normalized before insert
    pub email: String,

    /// Argon2id hash (NOT the plaintext password)
    pub password_hash: String,

    /// Subscription to attach at sign-up, if the browser registered one
    pub subscription: Option<PushSubscription>,
}

/// Normalizes an email for storage and lookup
///
/// Uniqueness is case-insensitive: `Ada@X.com` and `ada@x.com` are one account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Returns the user's push subscription, if one is attached
    pub fn subscription(&self) -> Option<PushSubscription> {
        PushSubscription::from_columns(
            self.push_endpoint.clone(),
            self.push_p256dh.clone(),
            self.push_auth.clone(),
        )
    }

    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns a database error on unique violation of `users_email_key` when
    /// the email is already registered
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let (endpoint, p256dh, auth) = match data.subscription {
            Some(sub) => (Some(sub.endpoint), Some(sub.keys.p256dh), Some(sub.keys.auth)),
            None => (None, None, None),
        };

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, push_endpoint, push_p256dh, push_auth)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, password_hash, push_endpoint, push_p256dh, push_auth,
                      created_at
            "#,
        )
        .bind(data.name)
        .bind(normalize_email(&data.email))
        .bind(data.password_hash)
        .bind(endpoint)
        .bind(p256dh)
        .bind(auth)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, push_endpoint, push_p256dh, push_auth,
                   created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, push_endpoint, push_p256dh, push_auth,
                   created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Attaches or replaces the user's push subscription
    ///
    /// # Returns
    ///
    /// True if the user exists and was updated
    pub async fn update_subscription(
        pool: &PgPool,
        id: i64,
        subscription: &PushSubscription,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET push_endpoint = $2, push_p256dh = $3, push_auth = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&subscription.endpoint)
        .bind(&subscription.keys.p256dh)
        .bind(&subscription.keys.auth)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts users registered under an email
    ///
    /// Zero or one; the unique index guarantees it never exceeds one.
    pub async fn count_by_email(pool: &PgPool, email: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Deletes a user and, by cascade, their to-dos
    ///
    /// Not reachable from the HTTP surface; used to clean up test fixtures.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
