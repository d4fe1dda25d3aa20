/// Push subscription capture
///
/// # Endpoint
///
/// ```text
/// POST /save-token
/// {"endpoint": "https://...", "keys": {"p256dh": "...", "auth": "..."}}
/// ```
///
/// A logged-in caller's subscription is stored on their account right away.
/// Anonymous visitors get it back as a signed `duetask_push` cookie, which
/// `/signup` or `/login` then links to the account. Nothing is held in server
/// memory between requests.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use duetask_shared::{
    auth::session::{create_pending_subscription_token, TokenKind},
    models::subscription::PushSubscription,
    services::accounts,
};

use crate::{
    app::AppState,
    cookies::{set_cookie, PENDING_PUSH_COOKIE},
    error::{ApiError, ApiResult},
    middleware::session::CurrentUser,
    routes::todos::MessageResponse,
};

pub async fn save_token(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: Result<Json<PushSubscription>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(subscription) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    subscription
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let reply = Json(MessageResponse {
        message: "Subscription received successfully".to_string(),
    });

    match current.user() {
        Some(user) => {
            accounts::attach_subscription(&state.db, user.id, &subscription).await?;
            Ok(reply.into_response())
        }
        None => {
            let token = create_pending_subscription_token(&subscription, state.session_secret())?;
            let cookie = set_cookie(
                PENDING_PUSH_COOKIE,
                &token,
                TokenKind::PendingSubscription.default_expiration(),
                state.cookie_secure(),
            );
            tracing::debug!("Holding push subscription until sign-up or login");
            Ok(([(header::SET_COOKIE, cookie)], reply).into_response())
        }
    }
}
