//! Router tests that never reach the database
//!
//! Every request here is answered before any query runs: login gates,
//! form pages, the anonymous `/save-token` path, static files and response
//! headers.

mod common;

use axum::http::{header, StatusCode};
use common::*;

#[tokio::test]
async fn test_landing_page_for_anonymous_visitor() {
    let app = TestApp::without_database();

    let response = app.get("/", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Never miss a due date"));
    assert!(html.contains(r#"href="/signup""#));
    assert!(html.contains(r#"<meta name="vapid-public-key" content="BTestPublicKey">"#));
}

#[tokio::test]
async fn test_signup_and_login_forms_render() {
    let app = TestApp::without_database();

    let html = body_text(app.get("/signup", &[]).await).await;
    assert!(html.contains(r#"action="/signup""#));
    assert!(html.contains(r#"name="name""#));

    let html = body_text(app.get("/login", &[]).await).await;
    assert!(html.contains(r#"action="/login""#));
    assert!(html.contains(r#"id="show_password""#));
}

#[tokio::test]
async fn test_pages_redirect_anonymous_to_login() {
    let app = TestApp::without_database();

    for uri in ["/add", "/edit_todo/1", "/delete/1"] {
        let response = app.get(uri, &[]).await;
        assert_redirect(&response, "/login");
        assert!(cookie(&response, "duetask_flash").is_some());
    }

    let response = app
        .post_form("/add", &[], &[("title", "Pay bills"), ("due_date", "")])
        .await;
    assert_redirect(&response, "/login");
}

#[tokio::test]
async fn test_status_toggle_requires_session() {
    let app = TestApp::without_database();

    let response = app
        .post_json("/updatetodo/1", &[], r#"{"completed": true}"#)
        .await;
    assert_redirect(&response, "/login");

    let (_, flash) = cookie(&response, "duetask_flash").unwrap();
    assert!(flash.starts_with("info:"));
}

#[tokio::test]
async fn test_forged_session_is_anonymous() {
    let app = TestApp::without_database();
    let cookies = vec![("duetask_session".to_string(), "not.a.token".to_string())];

    let response = app.get("/add", &cookies).await;
    assert_redirect(&response, "/login");
}

#[tokio::test]
async fn test_anonymous_save_token_sets_pending_cookie() {
    let app = TestApp::without_database();

    let response = app.post_json("/save-token", &[], SUBSCRIPTION_JSON).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (_, token) = cookie(&response, "duetask_push").expect("pending subscription cookie");
    let subscription =
        duetask_shared::auth::session::validate_pending_subscription_token(&token, SECRET)
            .unwrap();
    assert_eq!(subscription.endpoint, "https://push.example.net/send/ada");

    let attrs = set_cookies(&response)
        .into_iter()
        .find(|(name, _, _)| name == "duetask_push")
        .map(|(_, _, attrs)| attrs)
        .unwrap();
    assert!(attrs.contains("HttpOnly"));
    assert!(attrs.contains("Max-Age=3600"));

    let json = body_json(response).await;
    assert_eq!(json["message"], "Subscription received successfully");
}

#[tokio::test]
async fn test_invalid_subscription_is_rejected() {
    let app = TestApp::without_database();

    let plain_http = r#"{"endpoint": "http://push.example.net/x", "keys": {"p256dh": "k", "auth": "a"}}"#;
    let response = app.post_json("/save-token", &[], plain_http).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(cookie(&response, "duetask_push").is_none());

    let missing_keys = r#"{"endpoint": "https://push.example.net/x"}"#;
    let response = app.post_json("/save-token", &[], missing_keys).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "bad_request");
}

#[tokio::test]
async fn test_oversized_subscription_endpoint_is_rejected() {
    let app = TestApp::without_database();

    let endpoint = format!("https://push.example.net/{}", "a".repeat(4096));
    let body = format!(
        r#"{{"endpoint": "{}", "keys": {{"p256dh": "k", "auth": "a"}}}}"#,
        endpoint
    );
    let response = app.post_json("/save-token", &[], &body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(cookie(&response, "duetask_push").is_none());
}

#[tokio::test]
async fn test_flash_is_shown_once_then_cleared() {
    let app = TestApp::without_database();
    let cookies = vec![(
        "duetask_flash".to_string(),
        "danger:Invalid%20Password%21".to_string(),
    )];

    let response = app.get("/login", &cookies).await;
    assert!(clears_cookie(&response, "duetask_flash"));

    let html = body_text(response).await;
    assert!(html.contains("Invalid Password!"));
    assert!(html.contains("flash-danger"));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = TestApp::without_database();

    let response = app.get("/logout", &[]).await;
    assert_redirect(&response, "/");
    assert!(clears_cookie(&response, "duetask_session"));
}

#[tokio::test]
async fn test_security_headers_and_static_assets() {
    let app = TestApp::without_database();

    let response = app.get("/static/sw.js", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
    let csp = response
        .headers()
        .get(header::CONTENT_SECURITY_POLICY)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(csp.contains("worker-src 'self'"));

    let script = body_text(response).await;
    assert!(script.contains("showNotification('TODO'"));
}
