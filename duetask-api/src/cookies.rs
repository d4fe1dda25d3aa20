/// Cookie helpers
///
/// Three cookies carry all per-browser state:
///
/// | Name               | Contents                                 | Lifetime |
/// |--------------------|------------------------------------------|----------|
/// | `duetask_session`  | Signed session token                     | 7 days   |
/// | `duetask_push`     | Signed pending push subscription         | 1 hour   |
/// | `duetask_flash`    | One-shot message for the next page       | 5 min    |
///
/// All are `HttpOnly; SameSite=Lax; Path=/`, plus `Secure` when configured.

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::Duration;

pub const SESSION_COOKIE: &str = "duetask_session";
pub const PENDING_PUSH_COOKIE: &str = "duetask_push";
pub const FLASH_COOKIE: &str = "duetask_flash";

/// Reads a cookie value from the request `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Builds a `Set-Cookie` value
pub fn set_cookie(name: &str, value: &str, max_age: Duration, secure: bool) -> HeaderValue {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name,
        value,
        max_age.num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie).unwrap_or_else(|_| clear_cookie(name, secure))
}

/// Builds a `Set-Cookie` value that deletes the cookie
pub fn clear_cookie(name: &str, secure: bool) -> HeaderValue {
    let mut cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name);
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("invalid=; Max-Age=0"))
}
