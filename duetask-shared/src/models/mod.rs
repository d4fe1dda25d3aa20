/// Database models for DueTask
///
/// # Models
///
/// - `user`: user accounts, password hashes and push subscriptions
/// - `todo`: to-do items owned by a user
/// - `subscription`: the browser push subscription descriptor
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
/// # Ok(())
/// # }
/// ```

pub mod subscription;
pub mod todo;
pub mod user;
