/// HTTP route handlers
///
/// - `health`: health check
/// - `auth`: sign-up, login and logout
/// - `todos`: to-do list pages and the completion toggle
/// - `push`: browser push subscription capture

pub mod auth;
pub mod health;
pub mod push;
pub mod todos;

use axum::{
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
};

use crate::{
    app::AppState,
    flash::Flash,
    middleware::session::SessionUser,
    views::PageContext,
};

/// Renders an HTML page, consuming any pending flash
pub(crate) fn page<F>(
    state: &AppState,
    headers: &HeaderMap,
    user: Option<&SessionUser>,
    render: F,
) -> Response
where
    F: FnOnce(&PageContext<'_>) -> String,
{
    let flash = Flash::from_headers(headers);
    let had_flash = flash.is_some();

    let ctx = PageContext {
        user,
        flash,
        vapid_public_key: state.config.api.vapid_public_key.as_deref(),
    };

    let mut response = Html(render(&ctx)).into_response();
    if had_flash {
        response.headers_mut().append(
            header::SET_COOKIE,
            Flash::clear_cookie(state.cookie_secure()),
        );
    }
    response
}
