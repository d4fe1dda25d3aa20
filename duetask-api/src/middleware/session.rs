/// Session middleware
///
/// [`session_layer`] runs on every request: it validates the
/// `duetask_session` cookie and stores a [`CurrentUser`] in the request
/// extensions. Protected routes add [`require_login`], which redirects
/// anonymous callers to `/login` and otherwise inserts the [`SessionUser`]
/// handlers extract.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use duetask_shared::auth::session::{
    create_session_token, validate_session_token, SessionClaims, SessionError, TokenKind,
};

use crate::{
    app::AppState,
    cookies::{clear_cookie, read_cookie, set_cookie, SESSION_COOKIE},
    error::ApiError,
};

/// The logged-in user, as recorded in the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub name: String,
}

/// Identity bound to the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentUser {
    Authenticated(SessionUser),
    Anonymous,
}

impl CurrentUser {
    /// Resolves the session cookie; anything invalid or expired is anonymous
    pub fn from_headers(headers: &HeaderMap, secret: &str) -> Self {
        let Some(token) = read_cookie(headers, SESSION_COOKIE) else {
            return CurrentUser::Anonymous;
        };

        match validate_session_token(&token, secret) {
            Ok(claims) => CurrentUser::Authenticated(SessionUser {
                id: claims.sub,
                name: claims.name,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session cookie");
                CurrentUser::Anonymous
            }
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            CurrentUser::Authenticated(user) => Some(user),
            CurrentUser::Anonymous => None,
        }
    }
}

/// `Set-Cookie` value establishing a session for `user`
pub fn session_cookie(user: &SessionUser, secret: &str, secure: bool) -> Result<HeaderValue, SessionError> {
    let token = create_session_token(&SessionClaims::new(user.id, user.name.clone()), secret)?;
    Ok(set_cookie(
        SESSION_COOKIE,
        &token,
        TokenKind::Session.default_expiration(),
        secure,
    ))
}

/// `Set-Cookie` value ending the session
pub fn end_session_cookie(secure: bool) -> HeaderValue {
    clear_cookie(SESSION_COOKIE, secure)
}

/// Attaches a [`CurrentUser`] to every request
pub async fn session_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let current = CurrentUser::from_headers(req.headers(), state.session_secret());
    req.extensions_mut().insert(current);
    next.run(req).await
}

fn session_user(req: &Request) -> Option<SessionUser> {
    req.extensions()
        .get::<CurrentUser>()
        .and_then(|current| current.user().cloned())
}

/// Gate for protected routes: anonymous callers are redirected to the login form
pub async fn require_login(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let user = session_user(&req).ok_or(ApiError::LoginRequired)?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
