//! Integration tests for member slot selection and weekly changes.

mod helpers;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use serde_json::json;

use helpers::slot;

#[tokio::test]
async fn test_first_assignment_becomes_permanent() {
    let app = helpers::TestApp::new();
    let (_, token) = app.member("ana@studio.test", 2, false).await;

    let response = app
        .request(
            "PUT",
            "/api/schedule/me",
            Some(json!({ "slots": [slot("wednesday", "18:00"), slot("monday", "08:00")] })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["outcome"], "created");
    assert_eq!(
        data["schedule"]["original_selections"],
        json!([slot("monday", "08:00"), slot("wednesday", "18:00")])
    );
    assert_eq!(data["schedule"]["changes_this_month"], 0);
    assert_eq!(data["schedule"]["changes_remaining"], 2);
}

#[tokio::test]
async fn test_first_assignment_must_match_quota() {
    let app = helpers::TestApp::new();
    let (_, token) = app.member("ana@studio.test", 2, false).await;

    let response = app
        .request(
            "PUT",
            "/api/schedule/me",
            Some(json!({ "slots": [slot("monday", "08:00")] })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.reason(), Some("QUOTA_MISMATCH"));
}

#[tokio::test]
async fn test_one_slot_per_day() {
    let app = helpers::TestApp::new();
    let (_, token) = app.member("ana@studio.test", 2, false).await;

    let response = app
        .request(
            "PUT",
            "/api/schedule/me",
            Some(json!({ "slots": [slot("monday", "08:00"), slot("monday", "18:00")] })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.reason(), Some("DUPLICATE_DAY"));
}

#[tokio::test]
async fn test_invalid_slot_is_rejected() {
    let app = helpers::TestApp::new();
    let (_, token) = app.member("ana@studio.test", 1, false).await;

    let response = app
        .request(
            "PUT",
            "/api/schedule/me",
            Some(json!({ "slots": [slot("sunday", "08:00")] })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "PUT",
            "/api/schedule/me",
            Some(json!({ "slots": [] })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_full_slot_is_refused() {
    let app = helpers::TestApp::with_capacity(2);
    for email in ["one@studio.test", "two@studio.test"] {
        let (_, token) = app.member(email, 1, true).await;
        app.assign(&token, json!([slot("tuesday", "09:00")])).await;
    }
    let (_, token) = app.member("late@studio.test", 1, true).await;

    let response = app
        .request(
            "PUT",
            "/api/schedule/me",
            Some(json!({ "slots": [slot("tuesday", "09:00")] })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "CONFLICT");
    assert_eq!(response.reason(), Some("SLOT_FULL"));
}

#[tokio::test]
async fn test_weekly_change_consumes_quota() {
    let app = helpers::TestApp::new();
    let (_, token) = app.member("ana@studio.test", 1, true).await;
    app.assign(&token, json!([slot("monday", "08:00")])).await;

    let response = app
        .request(
            "PUT",
            "/api/schedule/me",
            Some(json!({ "slots": [slot("thursday", "19:00")] })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["outcome"], "changed");
    assert_eq!(data["schedule"]["original_selections"], json!([slot("monday", "08:00")]));
    assert_eq!(
        data["schedule"]["effective_selections"],
        json!([slot("thursday", "19:00")])
    );
    assert_eq!(data["schedule"]["changes_this_month"], 1);
    assert_eq!(data["schedule"]["changes_remaining"], 1);
}

#[tokio::test]
async fn test_resubmitting_same_slots_is_free() {
    let app = helpers::TestApp::new();
    let (_, token) = app.member("ana@studio.test", 1, true).await;
    app.assign(&token, json!([slot("monday", "08:00")])).await;

    let response = app
        .request(
            "PUT",
            "/api/schedule/me",
            Some(json!({ "slots": [slot("monday", "08:00")] })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["outcome"], "unchanged");
    assert_eq!(response.body["data"]["schedule"]["changes_this_month"], 0);
}

#[tokio::test]
async fn test_monthly_change_limit() {
    let app = helpers::TestApp::new();
    let (_, token) = app.member("ana@studio.test", 1, true).await;
    app.assign(&token, json!([slot("monday", "08:00")])).await;

    for day in ["tuesday", "wednesday"] {
        let response = app
            .request(
                "PUT",
                "/api/schedule/me",
                Some(json!({ "slots": [slot(day, "08:00")] })),
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let response = app
        .request(
            "PUT",
            "/api/schedule/me",
            Some(json!({ "slots": [slot("thursday", "08:00")] })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.reason(), Some("CHANGE_LIMIT_EXCEEDED"));
}

#[tokio::test]
async fn test_unpaid_member_cannot_change_after_due_day() {
    // Wednesday 2025-03-12, noon studio time.
    let app = helpers::TestApp::at(Utc.with_ymd_and_hms(2025, 3, 12, 15, 0, 0).unwrap());
    let (_, token) = app.member("late-payer@studio.test", 1, false).await;
    app.assign(&token, json!([slot("monday", "08:00")])).await;

    let response = app
        .request(
            "PUT",
            "/api/schedule/me",
            Some(json!({ "slots": [slot("friday", "08:00")] })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.reason(), Some("PAYMENT_REQUIRED"));
}

#[tokio::test]
async fn test_cancel_slot_this_week() {
    let app = helpers::TestApp::new();
    let (_, token) = app.member("ana@studio.test", 2, true).await;
    app.assign(&token, json!([slot("monday", "08:00"), slot("friday", "10:00")]))
        .await;

    let response = app
        .request(
            "POST",
            "/api/schedule/me/cancel",
            Some(slot("friday", "10:00")),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["effective_selections"], json!([slot("monday", "08:00")]));
    assert_eq!(data["changes_this_month"], 0);

    // The last remaining slot stays.
    let response = app
        .request(
            "POST",
            "/api/schedule/me/cancel",
            Some(slot("monday", "08:00")),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "POST",
            "/api/schedule/me/cancel",
            Some(slot("tuesday", "08:00")),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_to_original() {
    let app = helpers::TestApp::new();
    let (_, token) = app.member("ana@studio.test", 1, true).await;
    app.assign(&token, json!([slot("monday", "08:00")])).await;
    app.assign(&token, json!([slot("tuesday", "08:00")])).await;

    let response = app
        .request("POST", "/api/schedule/me/reset", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["temporary_selections"], json!([]));
    assert_eq!(data["effective_selections"], json!([slot("monday", "08:00")]));
}

#[tokio::test]
async fn test_get_my_slots() {
    let app = helpers::TestApp::new();
    let (_, token) = app.member("ana@studio.test", 1, true).await;

    let response = app
        .request("GET", "/api/schedule/me", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["original_selections"], json!([]));

    app.assign(&token, json!([slot("monday", "08:00")])).await;

    let response = app
        .request("GET", "/api/schedule/me", None, Some(&token))
        .await;
    assert_eq!(response.body["data"]["weekly_quota"], 1);
    assert_eq!(response.body["data"]["paid"], true);
    assert_eq!(
        response.body["data"]["effective_selections"],
        json!([slot("monday", "08:00")])
    );
}

#[tokio::test]
async fn test_list_slots_shows_occupants() {
    let app = helpers::TestApp::new();
    let (ana, ana_token) = app.member("ana@studio.test", 1, true).await;
    let (bea, bea_token) = app.member("bea@studio.test", 1, true).await;
    app.assign(&ana_token, json!([slot("friday", "18:00")])).await;
    app.assign(&bea_token, json!([slot("monday", "08:00")])).await;

    let response = app
        .request("GET", "/api/schedule/slots", None, Some(&ana_token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let slots = response.body["data"].as_array().unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0]["day"], "monday");
    assert_eq!(slots[0]["users"][0]["id"], bea.to_string());
    assert_eq!(slots[1]["day"], "friday");
    assert_eq!(slots[1]["users"][0]["id"], ana.to_string());
}

#[tokio::test]
async fn test_schedule_requires_authentication() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/schedule/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.request("GET", "/api/schedule/slots", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
