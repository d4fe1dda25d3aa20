/// To-do endpoints
///
/// # Endpoints
///
/// - `GET  /`               - The caller's list, or the landing page when anonymous
/// - `GET  /add`            - Add form
/// - `POST /add`            - Create a to-do
/// - `GET  /edit_todo/:id`  - Edit form (owner only)
/// - `POST /edit_todo/:id`  - Apply edits (owner only)
/// - `GET  /delete/:id`     - Delete and return home (owner only)
/// - `POST /updatetodo/:id` - JSON completion toggle (owner only)

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
    Extension, Form, Json,
};
use chrono::Local;
use duetask_shared::services::todos::{self, TodoInput};
use serde::{Deserialize, Serialize};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    flash::FlashRedirect,
    middleware::session::{CurrentUser, SessionUser},
    routes::page,
    views,
};

/// Add/edit form fields
///
/// `alert` is an HTML checkbox: present ("on") when ticked, absent otherwise.
#[derive(Debug, Deserialize)]
pub struct TodoForm {
    pub title: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub alert: Option<String>,
}

impl TodoForm {
    fn into_input(self, form_path: &str) -> ApiResult<TodoInput> {
        TodoInput::parse(&self.title, self.due_date.as_deref(), self.alert.is_some())
            .map_err(|e| ApiError::from_form(e, form_path))
    }
}

/// Completion toggle request
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub completed: bool,
}

/// Plain `{message}` JSON reply
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Home page
pub async fn index(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let Some(user) = current.user() else {
        return Ok(page(&state, &headers, None, views::landing));
    };

    let list = todos::list(&state.db, user.id).await?;
    Ok(page(&state, &headers, Some(user), |ctx| {
        views::todo_list(ctx, &list)
    }))
}

pub async fn add_form(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    headers: HeaderMap,
) -> Response {
    page(&state, &headers, Some(&user), views::add_form)
}

/// Creates a to-do dated with the server's local calendar day
pub async fn add(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Form(form): Form<TodoForm>,
) -> ApiResult<FlashRedirect> {
    let input = form.into_input("/add")?;
    let today = Local::now().date_naive();

    todos::create(&state.db, user.id, input, today).await?;
    Ok(FlashRedirect::to("/"))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(todo_id): Path<i64>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let todo = todos::get(&state.db, user.id, todo_id).await?;
    Ok(page(&state, &headers, Some(&user), |ctx| {
        views::edit_form(ctx, &todo)
    }))
}

pub async fn edit(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(todo_id): Path<i64>,
    Form(form): Form<TodoForm>,
) -> ApiResult<FlashRedirect> {
    let input = form.into_input(&format!("/edit_todo/{}", todo_id))?;

    todos::update(&state.db, user.id, todo_id, input).await?;
    Ok(FlashRedirect::to("/"))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(todo_id): Path<i64>,
) -> ApiResult<FlashRedirect> {
    todos::delete(&state.db, user.id, todo_id).await?;
    Ok(FlashRedirect::to("/"))
}

/// Sets the completion flag from the list page checkbox
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(todo_id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<Json<MessageResponse>> {
    todos::set_completed(&state.db, user.id, todo_id, update.completed).await?;

    Ok(Json(MessageResponse {
        message: format!("Todo ID {} status updated successfully", todo_id),
    }))
}
