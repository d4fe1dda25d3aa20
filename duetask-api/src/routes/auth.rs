/// Authentication endpoints
///
/// # Endpoints
///
/// - `GET  /signup` - Sign-up form
/// - `POST /signup` - Register, log in, and link any pending push subscription
/// - `GET  /login`  - Login form
/// - `POST /login`  - Authenticate and link any pending push subscription
/// - `GET  /logout` - End the session
///
/// A push subscription captured by `/save-token` before the visitor had an
/// account travels in the `duetask_push` cookie; it is read from the same
/// request here and the cookie is cleared once it has been used.

use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
    Extension, Form,
};
use duetask_shared::{
    auth::session::validate_pending_subscription_token,
    models::subscription::PushSubscription,
    services::{
        accounts::{self, Registration},
        ServiceError,
    },
};
use serde::Deserialize;

use crate::{
    app::AppState,
    cookies::{clear_cookie, read_cookie, PENDING_PUSH_COOKIE},
    error::{ApiError, ApiResult},
    flash::{Flash, FlashRedirect},
    middleware::session::{end_session_cookie, session_cookie, CurrentUser, SessionUser},
    routes::page,
    views,
};

/// Sign-up form fields
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login form fields
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Reads the pending subscription cookie; a stale or forged one is ignored
fn pending_subscription(headers: &HeaderMap, secret: &str) -> Option<PushSubscription> {
    let token = read_cookie(headers, PENDING_PUSH_COOKIE)?;
    match validate_pending_subscription_token(&token, secret) {
        Ok(subscription) => Some(subscription),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring pending subscription cookie");
            None
        }
    }
}

fn logged_in(
    state: &AppState,
    user: SessionUser,
    flash: Flash,
    had_pending: bool,
) -> ApiResult<FlashRedirect> {
    let secure = state.cookie_secure();
    let cookie = session_cookie(&user, state.session_secret(), secure)?;

    let mut redirect = FlashRedirect::to("/")
        .with_flash(flash)
        .with_cookie(cookie)
        .secure(secure);
    if had_pending {
        redirect = redirect.with_cookie(clear_cookie(PENDING_PUSH_COOKIE, secure));
    }
    Ok(redirect)
}

pub async fn signup_form(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    headers: HeaderMap,
) -> Response {
    page(&state, &headers, current.user(), views::signup_form)
}

/// Registers a new account
///
/// # Errors
///
/// - Taken email: redirect to `/login` with a warning
/// - Invalid fields: redirect back to `/signup` with the reason
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SignupForm>,
) -> ApiResult<FlashRedirect> {
    let pending = pending_subscription(&headers, state.session_secret());
    let had_pending = read_cookie(&headers, PENDING_PUSH_COOKIE).is_some();

    let user = accounts::register(
        &state.db,
        Registration::new(form.name, form.email, form.password),
        pending,
        &state.config.password,
    )
    .await
    .map_err(|e| ApiError::from_form(e, "/signup"))?;

    logged_in(
        &state,
        SessionUser {
            id: user.id,
            name: user.name,
        },
        Flash::success("Success! You're now signed up. Ready to tackle your to-dos?"),
        had_pending,
    )
}

pub async fn login_form(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    headers: HeaderMap,
) -> Response {
    page(&state, &headers, current.user(), views::login_form)
}

/// Logs in with email and password
///
/// # Errors
///
/// - Unknown email: redirect to `/signup`
/// - Wrong password: redirect back to `/login`
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> ApiResult<FlashRedirect> {
    let user = accounts::authenticate(&state.db, &form.email, &form.password).await?;

    let had_pending = read_cookie(&headers, PENDING_PUSH_COOKIE).is_some();
    if let Some(subscription) = pending_subscription(&headers, state.session_secret()) {
        match accounts::attach_subscription(&state.db, user.id, &subscription).await {
            Ok(()) => {}
            Err(ServiceError::Validation { message, .. }) => {
                tracing::warn!(user_id = user.id, %message, "Discarding pending subscription");
            }
            Err(e) => return Err(e.into()),
        }
    }

    logged_in(
        &state,
        SessionUser {
            id: user.id,
            name: user.name,
        },
        Flash::success("Success! You're now logged in."),
        had_pending,
    )
}

/// Ends the session and returns to the landing page
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> FlashRedirect {
    if let Some(user) = current.user() {
        tracing::info!(user_id = user.id, "User logged out");
    }

    let secure = state.cookie_secure();
    FlashRedirect::to("/")
        .with_cookie(end_session_cookie(secure))
        .secure(secure)
}
