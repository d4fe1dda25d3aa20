/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`.
///
/// Authentication and authorization failures (bad credentials, a taken
/// email, a missing session, someone else's to-do) and forms that did not
/// validate never render an error page: they become a flash message plus a
/// `303 See Other` redirect. Everything else answers with a JSON body
/// `{ "error": code, "message": text }`.
///
/// # Mapping
///
/// | Error                         | Response                                   |
/// |-------------------------------|--------------------------------------------|
/// | `DuplicateEmail`              | 303 → `/login`, "You already signed up. Please log in" |
/// | `NoSuchAccount`               | 303 → `/signup`, "No account found. Please sign up." |
/// | `InvalidPassword`             | 303 → `/login`, "Invalid Password!"        |
/// | `LoginRequired`               | 303 → `/login`, "Please log in to continue." |
/// | `Forbidden` (not the owner)   | 303 → `/`, "You can't change a to-do that isn't yours." |
/// | `NotFound`                    | 404                                        |
/// | `BadRequest`                  | 400                                        |
/// | database / hashing failures   | 500, details logged only                   |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use duetask_shared::{
    auth::{authorization::AuthzError, session::SessionError},
    services::ServiceError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::flash::{Flash, FlashRedirect};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Redirect with a flash message (303)
    Redirect { location: String, flash: Flash },

    /// Page requires a session; redirect to the login form (303)
    LoginRequired,

    /// Bad request (400)
    BadRequest(String),

    /// Not found (404)
    NotFound(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "bad_request")
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn redirect(location: impl Into<String>, flash: Flash) -> Self {
        ApiError::Redirect {
            location: location.into(),
            flash,
        }
    }

    /// Maps a service error raised while handling a form
    ///
    /// Validation failures go back to `form` with the message flashed; all
    /// other errors map as usual.
    pub fn from_form(err: ServiceError, form: &str) -> Self {
        match err {
            ServiceError::Validation { message, .. } => {
                ApiError::redirect(form, Flash::warning(message))
            }
            other => other.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Redirect { location, flash } => {
                write!(f, "Redirect to {}: {}", location, flash.message)
            }
            ApiError::LoginRequired => write!(f, "Login required"),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Redirect { location, flash } => {
                return FlashRedirect::to(location).with_flash(flash).into_response();
            }
            ApiError::LoginRequired => {
                return FlashRedirect::to("/login")
                    .with_flash(Flash::info("Please log in to continue."))
                    .into_response();
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::DuplicateEmail => {
                ApiError::redirect("/login", Flash::warning("You already signed up. Please log in"))
            }
            ServiceError::NoSuchAccount => {
                ApiError::redirect("/signup", Flash::danger("No account found. Please sign up."))
            }
            ServiceError::InvalidPassword => {
                ApiError::redirect("/login", Flash::danger("Invalid Password!"))
            }
            ServiceError::NotFound(id) => ApiError::NotFound(format!("To-do {} not found", id)),
            ServiceError::Forbidden(e) => e.into(),
            ServiceError::Validation { field, message } => {
                ApiError::BadRequest(format!("{}: {}", field, message))
            }
            ServiceError::Password(e) => {
                ApiError::InternalError(format!("Password operation failed: {}", e))
            }
            ServiceError::Database(e) => e.into(),
            ServiceError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::InternalError(format!("Database error: {}", err))
    }
}

/// Someone else's to-do sends the caller back to their own list
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotOwner { .. } => ApiError::redirect(
                "/",
                Flash::danger("You can't change a to-do that isn't yours."),
            ),
        }
    }
}

/// Signing a cookie can only fail on a server-side problem
impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::InternalError(format!("Session token error: {}", err))
    }
}
