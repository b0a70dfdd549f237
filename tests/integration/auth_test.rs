//! Integration tests for registration, login, and password recovery.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use studio_service::NotificationKind;

fn registration(email: &str) -> serde_json::Value {
    json!({
        "name": "Lucia",
        "surname": "Fernandez",
        "email": email,
        "phone": "11 5555-1234",
        "weekly_quota": 2,
        "password": helpers::PASSWORD,
        "password_confirmation": helpers::PASSWORD,
    })
}

#[tokio::test]
async fn test_register_signs_member_in() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(registration("Lucia@Studio.test")),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let data = &response.body["data"];
    assert_eq!(data["user"]["email"], "lucia@studio.test");
    assert_eq!(data["user"]["phone"], "1155551234");
    assert_eq!(data["user"]["role"], "user");
    assert_eq!(data["user"]["paid"], false);
    assert!(data["user"].get("password_hash").is_none());
    assert!(data["access_token"].is_string());
    assert!(data["refresh_token"].is_string());

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::Welcome);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = helpers::TestApp::new();
    app.member("taken@studio.test", 1, false).await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(registration("taken@studio.test")),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_register_rejects_invalid_fields() {
    let app = helpers::TestApp::new();
    let mut body = registration("not-an-email");
    body["surname"] = json!("");

    let response = app
        .request("POST", "/api/auth/register", Some(body), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    let message = response.body["message"].as_str().unwrap();
    assert!(message.contains("email"));
    assert!(message.contains("surname"));
}

#[tokio::test]
async fn test_register_rejects_quota_out_of_range() {
    let app = helpers::TestApp::new();
    let mut body = registration("quota@studio.test");
    body["weekly_quota"] = json!(5);

    let response = app
        .request("POST", "/api/auth/register", Some(body), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let app = helpers::TestApp::new();
    let mut body = registration("weak@studio.test");
    body["password"] = json!("lowercase1");
    body["password_confirmation"] = json!("lowercase1");

    let response = app
        .request("POST", "/api/auth/register", Some(body), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "missing-password@studio.test" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = helpers::TestApp::new();
    app.member("member@studio.test", 1, false).await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({
                "email": "member@studio.test",
                "password": "WrongPassword1",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({
                "email": "nobody@studio.test",
                "password": helpers::PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_authenticated() {
    let app = helpers::TestApp::new();
    let (id, token) = app.member("me@studio.test", 3, true).await;

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["id"], id.to_string());
    assert_eq!(response.body["data"]["weekly_quota"], 3);
}

#[tokio::test]
async fn test_me_unauthenticated() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/auth/me", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_account_token_is_rejected() {
    let app = helpers::TestApp::new();
    let (_, admin) = app.admin().await;
    let (id, token) = app.member("gone@studio.test", 1, false).await;

    let response = app
        .request("DELETE", &format!("/api/admin/users/{id}"), None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let app = helpers::TestApp::new();
    app.member("refresh@studio.test", 1, false).await;

    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({
                "email": "refresh@studio.test",
                "password": helpers::PASSWORD,
            })),
            None,
        )
        .await;
    let refresh_token = login.body["data"]["refresh_token"].as_str().unwrap();
    let access_token = login.body["data"]["access_token"].as_str().unwrap();

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refresh_token": refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["access_token"].is_string());

    // An access token cannot stand in for a refresh token.
    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refresh_token": access_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = helpers::TestApp::new();
    app.member("forgetful@studio.test", 1, false).await;

    let response = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            Some(json!({ "email": "forgetful@studio.test" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let sent = app.notifier.sent();
    let reset = sent
        .iter()
        .find(|n| n.kind == NotificationKind::PasswordReset)
        .expect("no reset notification");
    let token = reset.body.rsplit('/').next().unwrap().to_string();

    let response = app
        .request(
            "POST",
            &format!("/api/auth/reset-password/{token}"),
            Some(json!({
                "password": "NewSecret99",
                "password_confirmation": "NewSecret99",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    app.login("forgetful@studio.test", "NewSecret99").await;

    // The token is single use.
    let response = app
        .request(
            "POST",
            &format!("/api/auth/reset-password/{token}"),
            Some(json!({
                "password": "Another123",
                "password_confirmation": "Another123",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forgot_password_unknown_email() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            Some(json!({ "email": "ghost@studio.test" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(app.notifier.sent().is_empty());
}
