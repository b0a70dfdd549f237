//! Integration tests for recoverable turns.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestApp, slot};

/// A paid two-class member on Monday 08:00 and Wednesday 18:00 with the
/// Wednesday session saved.
async fn member_with_turn(app: &TestApp, email: &str) -> (String, String) {
    let (_, token) = app.member(email, 2, true).await;
    app.assign(&token, json!([slot("monday", "08:00"), slot("wednesday", "18:00")]))
        .await;

    let response = app
        .request(
            "POST",
            "/api/turns",
            Some(slot("wednesday", "18:00")),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let turn_id = response.body["data"]["id"].as_str().unwrap().to_string();
    (token, turn_id)
}

#[tokio::test]
async fn test_save_turn_cancels_the_session() {
    let app = TestApp::new();
    let (_, token) = app.member("ana@studio.test", 2, true).await;
    app.assign(&token, json!([slot("monday", "08:00"), slot("wednesday", "18:00")]))
        .await;

    let response = app
        .request(
            "POST",
            "/api/turns",
            Some(slot("wednesday", "18:00")),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let turn = &response.body["data"];
    assert_eq!(turn["original_day"], "wednesday");
    assert_eq!(turn["original_hour"], "18:00");
    assert_eq!(turn["cancelled_week"], "2025-03-03");
    assert_eq!(turn["recovered"], false);

    let schedule = app
        .request("GET", "/api/schedule/me", None, Some(&token))
        .await;
    assert_eq!(schedule.body["data"]["changes_this_month"], 1);
    // The seat is freed for this week only.
    assert_eq!(
        schedule.body["data"]["original_selections"],
        json!([slot("monday", "08:00"), slot("wednesday", "18:00")])
    );
    assert_eq!(
        schedule.body["data"]["effective_selections"],
        json!([slot("monday", "08:00")])
    );

    let slots = app
        .request("GET", "/api/schedule/slots", None, Some(&token))
        .await;
    assert!(
        slots.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|s| s["day"] != "wednesday")
    );
}

#[tokio::test]
async fn test_last_session_cannot_be_saved() {
    let app = TestApp::new();
    let (_, token) = app.member("ana@studio.test", 1, true).await;
    app.assign(&token, json!([slot("wednesday", "18:00")])).await;

    let response = app
        .request(
            "POST",
            "/api/turns",
            Some(slot("wednesday", "18:00")),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_turn_requires_own_slot() {
    let app = TestApp::new();
    let (_, token) = app.member("ana@studio.test", 2, true).await;
    app.assign(&token, json!([slot("monday", "08:00"), slot("wednesday", "18:00")]))
        .await;

    let response = app
        .request(
            "POST",
            "/api/turns",
            Some(slot("thursday", "18:00")),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_redeem_and_revert() {
    let app = TestApp::new();
    let (token, turn_id) = member_with_turn(&app, "ana@studio.test").await;

    let pending = app.request("GET", "/api/turns", None, Some(&token)).await;
    assert_eq!(pending.status, StatusCode::OK);
    assert_eq!(pending.body["data"].as_array().unwrap().len(), 1);

    let response = app
        .request(
            "POST",
            &format!("/api/turns/{turn_id}/redeem"),
            Some(slot("friday", "10:00")),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let turn = &response.body["data"];
    assert_eq!(turn["recovered"], true);
    assert_eq!(turn["recovery_date"], "2025-03-07");
    assert_eq!(turn["assigned_day"], "friday");
    assert_eq!(turn["assigned_hour"], "10:00");

    let pending = app.request("GET", "/api/turns", None, Some(&token)).await;
    assert_eq!(pending.body["data"], json!([]));

    let redeemed = app
        .request(
            "GET",
            "/api/turns/redeemed?from=2025-03-01&to=2025-03-31",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(redeemed.status, StatusCode::OK);
    let redeemed = redeemed.body["data"].as_array().unwrap();
    assert_eq!(redeemed.len(), 1);
    assert_eq!(redeemed[0]["id"], turn_id.as_str());
    assert_eq!(redeemed[0]["surname"], "Tester");

    let response = app
        .request(
            "POST",
            &format!("/api/turns/{turn_id}/revert"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["recovered"], false);
    assert!(response.body["data"]["recovery_date"].is_null());

    let pending = app.request("GET", "/api/turns", None, Some(&token)).await;
    assert_eq!(pending.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_redeem_next_week() {
    let app = TestApp::new();
    let (token, turn_id) = member_with_turn(&app, "ana@studio.test").await;

    let response = app
        .request(
            "POST",
            &format!("/api/turns/{turn_id}/redeem"),
            Some(json!({ "day": "friday", "hour": "10:00", "next_week": true })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["recovery_date"], "2025-03-14");
}

#[tokio::test]
async fn test_redeem_twice_is_refused() {
    let app = TestApp::new();
    let (token, turn_id) = member_with_turn(&app, "ana@studio.test").await;
    let path = format!("/api/turns/{turn_id}/redeem");

    let first = app
        .request("POST", &path, Some(slot("friday", "10:00")), Some(&token))
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app
        .request("POST", &path, Some(slot("thursday", "10:00")), Some(&token))
        .await;
    assert_eq!(second.status, StatusCode::FORBIDDEN);
    assert_eq!(second.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_redeem_on_holiday_is_refused() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;
    let (token, turn_id) = member_with_turn(&app, "ana@studio.test").await;

    let response = app
        .request(
            "POST",
            "/api/holidays",
            Some(json!({ "date": "2025-03-07", "description": "Studio closed" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app
        .request(
            "POST",
            &format!("/api/turns/{turn_id}/redeem"),
            Some(slot("friday", "10:00")),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_redeem_into_own_slot_is_refused() {
    let app = TestApp::new();
    let (token, turn_id) = member_with_turn(&app, "ana@studio.test").await;

    let response = app
        .request(
            "POST",
            &format!("/api/turns/{turn_id}/redeem"),
            Some(slot("monday", "08:00")),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_redeem_into_full_slot() {
    let app = TestApp::with_capacity(1);
    let (_, filler) = app.member("filler@studio.test", 1, true).await;
    app.assign(&filler, json!([slot("friday", "10:00")])).await;
    let (token, turn_id) = member_with_turn(&app, "ana@studio.test").await;

    let response = app
        .request(
            "POST",
            &format!("/api/turns/{turn_id}/redeem"),
            Some(slot("friday", "10:00")),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.reason(), Some("SLOT_FULL"));
}

#[tokio::test]
async fn test_turns_are_private() {
    let app = TestApp::new();
    let (_, turn_id) = member_with_turn(&app, "ana@studio.test").await;
    let (_, other) = app.member("bea@studio.test", 1, true).await;

    let response = app
        .request(
            "POST",
            &format!("/api/turns/{turn_id}/redeem"),
            Some(slot("friday", "10:00")),
            Some(&other),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("GET", "/api/turns", None, Some(&other)).await;
    assert_eq!(response.body["data"], json!([]));
}

#[tokio::test]
async fn test_malformed_turn_id() {
    let app = TestApp::new();
    let (_, token) = app.member("ana@studio.test", 1, true).await;

    let response = app
        .request(
            "POST",
            "/api/turns/not-a-uuid/revert",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}
