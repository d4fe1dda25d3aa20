/// To-do model and database operations
///
/// A to-do is owned by exactly one user for its whole life. Its editable fields
/// are the title, the optional due date and the alert flag; completion is
/// toggled separately. Deletion is a hard delete.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE todos (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     due_date DATE,
///     created_on DATE NOT NULL,
///     alert BOOLEAN NOT NULL DEFAULT FALSE,
///     completed BOOLEAN NOT NULL DEFAULT FALSE
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use duetask_shared::models::todo::{Todo, CreateTodo};
/// use chrono::{Days, Local};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, user_id: i64) -> Result<(), sqlx::Error> {
/// let today = Local::now().date_naive();
/// let todo = Todo::create(&pool, CreateTodo {
///     user_id,
///     title: "Pay bills".to_string(),
///     due_date: today.checked_add_days(Days::new(1)),
///     created_on: today,
///     alert: true,
/// }).await?;
///
/// Todo::set_completed(&pool, todo.id, true).await?;
/// # Ok(())
/// # }
/// ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::authorization::Owned;
use crate::models::subscription::PushSubscription;

/// To-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: i64,

    /// Owning user; never changes after creation
    pub user_id: i64,

    pub title: String,
    pub due_date: Option<NaiveDate>,

    /// Local calendar date the to-do was created
    pub created_on: NaiveDate,

    /// Opt-in to the due-tomorrow notification
    pub alert: bool,

    pub completed: bool,
}

impl Owned for Todo {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// Input for creating a to-do
#[derive(Debug, Clone)]
pub struct CreateTodo {
    pub user_id: i64,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub created_on: NaiveDate,
    pub alert: bool,
}

/// Editable fields of a to-do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTodo {
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub alert: bool,
}

/// A to-do that is due for notification, joined with its owner
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DueTodo {
    pub todo_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub push_endpoint: Option<String>,
    pub push_p256dh: Option<String>,
    pub push_auth: Option<String>,
}

impl DueTodo {
    /// The owner's subscription, if they registered one
    pub fn subscription(&self) -> Option<PushSubscription> {
        PushSubscription::from_columns(
            self.push_endpoint.clone(),
            self.push_p256dh.clone(),
            self.push_auth.clone(),
        )
    }
}

impl Todo {
    /// Creates a new, not yet completed to-do
    pub async fn create(pool: &PgPool, data: CreateTodo) -> Result<Self, sqlx::Error> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (user_id, title, due_date, created_on, alert, completed)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            RETURNING id, user_id, title, due_date, created_on, alert, completed
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.due_date)
        .bind(data.created_on)
        .bind(data.alert)
        .fetch_one(pool)
        .await?;

        Ok(todo)
    }

    /// Finds a to-do by ID regardless of owner
    ///
    /// Callers acting for a user must follow up with an ownership check.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, user_id, title, due_date, created_on, alert, completed
            FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(todo)
    }

    /// Lists a user's to-dos in insertion order
    pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let todos = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, user_id, title, due_date, created_on, alert, completed
            FROM todos
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(todos)
    }

    /// Replaces the editable fields
    ///
    /// # Returns
    ///
    /// The updated to-do, or None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateTodo,
    ) -> Result<Option<Self>, sqlx::Error> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET title = $2, due_date = $3, alert = $4
            WHERE id = $1
            RETURNING id, user_id, title, due_date, created_on, alert, completed
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.due_date)
        .bind(data.alert)
        .fetch_optional(pool)
        .await?;

        Ok(todo)
    }

    /// Sets the completion flag
    pub async fn set_completed(
        pool: &PgPool,
        id: i64,
        completed: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET completed = $2
            WHERE id = $1
            RETURNING id, user_id, title, due_date, created_on, alert, completed
            "#,
        )
        .bind(id)
        .bind(completed)
        .fetch_optional(pool)
        .await?;

        Ok(todo)
    }

    /// Deletes a to-do
    ///
    /// # Returns
    ///
    /// True if a row was deleted
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// To-dos due on `due_date` with alerts on and not yet completed
    ///
    /// One statement, joined with each owner's subscription columns, ordered
    /// by to-do id.
    pub async fn due_for_alert(
        pool: &PgPool,
        due_date: NaiveDate,
    ) -> Result<Vec<DueTodo>, sqlx::Error> {
        let due = sqlx::query_as::<_, DueTodo>(
            r#"
            SELECT t.id AS todo_id, t.user_id, u.name AS user_name, t.title,
                   t.due_date, u.push_endpoint, u.push_p256dh, u.push_auth
            FROM todos t
            JOIN users u ON u.id = t.user_id
            WHERE t.due_date = $1 AND t.alert = TRUE AND t.completed = FALSE
            ORDER BY t.id
            "#,
        )
        .bind(due_date)
        .fetch_all(pool)
        .await?;

        Ok(due)
    }
}
