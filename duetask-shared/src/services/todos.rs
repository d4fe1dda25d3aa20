/// To-do operations scoped to the calling user
///
/// Each operation on a specific to-do loads it first, answers `NotFound` if it
/// is gone and `Forbidden` if it belongs to someone else, and only then
/// mutates. Concurrent edits to the same to-do are last-writer-wins.

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::{
    auth::authorization::require_ownership,
    models::todo::{CreateTodo, Todo, UpdateTodo},
    services::error::{ServiceError, ServiceResult},
};

/// Date format accepted from forms (`<input type="date">`)
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Editable to-do fields after parsing and validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoInput {
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub alert: bool,
}

impl TodoInput {
    /// Builds input from raw form values
    ///
    /// The title is trimmed and must not be empty; an empty due date means
    /// "no due date".
    pub fn parse(title: &str, due_date: Option<&str>, alert: bool) -> ServiceResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ServiceError::validation("title", "Title must not be empty"));
        }

        Ok(Self {
            title: title.to_string(),
            due_date: parse_due_date(due_date.unwrap_or(""))?,
            alert,
        })
    }
}

/// Parses a `YYYY-MM-DD` due date; blank means none
pub fn parse_due_date(raw: &str) -> ServiceResult<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT)
        .map(Some)
        .map_err(|_| ServiceError::validation("due_date", "Due date must be YYYY-MM-DD"))
}

/// All of the caller's to-dos, in insertion order
pub async fn list(pool: &PgPool, user_id: i64) -> ServiceResult<Vec<Todo>> {
    Ok(Todo::list_by_user(pool, user_id).await?)
}

/// Loads one to-do for the caller
///
/// # Errors
///
/// - `ServiceError::NotFound` if the to-do does not exist
/// - `ServiceError::Forbidden` if it belongs to another user
pub async fn get(pool: &PgPool, user_id: i64, todo_id: i64) -> ServiceResult<Todo> {
    let todo = Todo::find_by_id(pool, todo_id)
        .await?
        .ok_or(ServiceError::NotFound(todo_id))?;

    require_ownership(&todo, user_id)?;
    Ok(todo)
}

/// Creates a to-do for the caller, not yet completed
///
/// `today` is the caller's local calendar date and becomes the creation date.
pub async fn create(
    pool: &PgPool,
    user_id: i64,
    input: TodoInput,
    today: NaiveDate,
) -> ServiceResult<Todo> {
    let todo = Todo::create(
        pool,
        CreateTodo {
            user_id,
            title: input.title,
            due_date: input.due_date,
            created_on: today,
            alert: input.alert,
        },
    )
    .await?;

    info!(user_id, todo_id = todo.id, alert = todo.alert, "To-do created");
    Ok(todo)
}

/// Replaces a to-do's title, due date and alert flag
pub async fn update(
    pool: &PgPool,
    user_id: i64,
    todo_id: i64,
    input: TodoInput,
) -> ServiceResult<Todo> {
    get(pool, user_id, todo_id).await?;

    let todo = Todo::update(
        pool,
        todo_id,
        UpdateTodo {
            title: input.title,
            due_date: input.due_date,
            alert: input.alert,
        },
    )
    .await?
    .ok_or(ServiceError::NotFound(todo_id))?;

    info!(user_id, todo_id, "To-do updated");
    Ok(todo)
}

/// Sets the completion flag
pub async fn set_completed(
    pool: &PgPool,
    user_id: i64,
    todo_id: i64,
    completed: bool,
) -> ServiceResult<Todo> {
    get(pool, user_id, todo_id).await?;

    let todo = Todo::set_completed(pool, todo_id, completed)
        .await?
        .ok_or(ServiceError::NotFound(todo_id))?;

    debug!(user_id, todo_id, completed, "To-do completion changed");
    Ok(todo)
}

/// Deletes a to-do
pub async fn delete(pool: &PgPool, user_id: i64, todo_id: i64) -> ServiceResult<()> {
    get(pool, user_id, todo_id).await?;

    if !Todo::delete(pool, todo_id).await? {
        return Err(ServiceError::NotFound(todo_id));
    }

    info!(user_id, todo_id, "To-do deleted");
    Ok(())
}
