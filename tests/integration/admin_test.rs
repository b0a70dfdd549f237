//! Integration tests for admin endpoints, holidays, notices, and health.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestApp, slot};

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let app = TestApp::new();
    let (_, member) = app.member("ana@studio.test", 1, true).await;

    let response = app
        .request("GET", "/api/admin/users", None, Some(&member))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN");

    let response = app
        .request(
            "POST",
            "/api/holidays",
            Some(json!({ "date": "2025-03-04" })),
            Some(&member),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.request("GET", "/api/admin/users", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_and_get_users() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;
    let (ana, _) = app.member("ana@studio.test", 2, false).await;
    app.member("bea@studio.test", 1, false).await;

    let response = app
        .request("GET", "/api/admin/users?page=1&per_page=2", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let page = &response.body["data"];
    assert_eq!(page["total"], 3);
    assert_eq!(page["per_page"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);

    let response = app
        .request("GET", &format!("/api/admin/users/{ana}"), None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["email"], "ana@studio.test");

    let response = app
        .request(
            "GET",
            "/api/admin/users/00000000-0000-4000-8000-000000000000",
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_user_quota_clears_schedule() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;
    let (ana, token) = app.member("ana@studio.test", 1, true).await;
    app.assign(&token, json!([slot("monday", "08:00")])).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/admin/users/{ana}"),
            Some(json!({ "name": "Anabel", "weekly_quota": 2 })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["name"], "Anabel");
    assert_eq!(response.body["data"]["weekly_quota"], 2);

    let schedule = app
        .request("GET", "/api/schedule/me", None, Some(&token))
        .await;
    assert_eq!(schedule.body["data"]["original_selections"], json!([]));

    let response = app
        .request(
            "PUT",
            &format!("/api/admin/users/{ana}"),
            Some(json!({})),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_cannot_delete_or_demote_self() {
    let app = TestApp::new();
    let (admin_id, admin) = app.admin().await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/admin/users/{admin_id}"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "PUT",
            &format!("/api/admin/users/{admin_id}"),
            Some(json!({ "role": "user" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_payment() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;
    let (ana, _) = app.member("ana@studio.test", 1, false).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/admin/users/{ana}/payment"),
            Some(json!({ "paid": true })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["paid"], true);
    assert!(response.body["data"]["paid_at"].is_string());
}

#[tokio::test]
async fn test_move_user_bypasses_capacity() {
    let app = TestApp::with_capacity(1);
    let (_, admin) = app.admin().await;
    let (_, filler) = app.member("filler@studio.test", 1, true).await;
    app.assign(&filler, json!([slot("tuesday", "09:00")])).await;
    let (ana, token) = app.member("ana@studio.test", 1, true).await;
    app.assign(&token, json!([slot("monday", "08:00")])).await;

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{ana}/schedule/move"),
            Some(json!({
                "current_slot": slot("monday", "08:00"),
                "new_slot": slot("tuesday", "09:00"),
            })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(
        response.body["data"]["original_selections"],
        json!([slot("tuesday", "09:00")])
    );

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{ana}/schedule/move"),
            Some(json!({
                "current_slot": slot("friday", "08:00"),
                "new_slot": slot("monday", "08:00"),
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_reset_refunds_a_change() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;
    let (ana, token) = app.member("ana@studio.test", 1, true).await;
    app.assign(&token, json!([slot("monday", "08:00")])).await;
    app.assign(&token, json!([slot("tuesday", "08:00")])).await;

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{ana}/schedule/reset"),
            None,
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["effective_selections"], json!([slot("monday", "08:00")]));
    assert_eq!(data["changes_this_month"], 0);
}

#[tokio::test]
async fn test_admin_cancel_member_slot() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;
    let (ana, token) = app.member("ana@studio.test", 2, true).await;
    app.assign(&token, json!([slot("monday", "08:00"), slot("thursday", "19:00")]))
        .await;

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{ana}/schedule/cancel"),
            Some(slot("thursday", "19:00")),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"]["effective_selections"],
        json!([slot("monday", "08:00")])
    );
}

#[tokio::test]
async fn test_admin_turn_management() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;
    let (_, token) = app.member("ana@studio.test", 2, true).await;
    app.assign(&token, json!([slot("monday", "08:00"), slot("wednesday", "18:00")]))
        .await;

    let saved = app
        .request(
            "POST",
            "/api/turns",
            Some(slot("wednesday", "18:00")),
            Some(&token),
        )
        .await;
    let turn_id = saved.body["data"]["id"].as_str().unwrap().to_string();
    let redeemed = app
        .request(
            "POST",
            &format!("/api/turns/{turn_id}/redeem"),
            Some(slot("friday", "10:00")),
            Some(&token),
        )
        .await;
    assert_eq!(redeemed.status, StatusCode::OK);

    let response = app
        .request(
            "DELETE",
            &format!("/api/admin/turns/{turn_id}/redemption"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["recovered"], false);

    // Nothing redeemed before this month remains to purge.
    let response = app
        .request("POST", "/api/admin/turns/purge", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], 0);
}

#[tokio::test]
async fn test_holiday_registry() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;
    let (_, member) = app.member("ana@studio.test", 1, true).await;

    let response = app
        .request(
            "POST",
            "/api/holidays",
            Some(json!({ "date": "2025-03-04", "description": "Carnival" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["date"], "2025-03-04");

    let response = app
        .request(
            "POST",
            "/api/holidays",
            Some(json!({ "date": "2025-03-04" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.request("GET", "/api/holidays", None, Some(&member)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"][0]["description"], "Carnival");

    let response = app
        .request("DELETE", "/api/holidays/2025-03-04", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("DELETE", "/api/holidays/2025-03-04", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("DELETE", "/api/holidays/04-03-2025", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notice_lifecycle() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;

    let response = app.request("GET", "/api/notices/latest", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"].is_null());

    let response = app
        .request(
            "POST",
            "/api/admin/notices",
            Some(json!({
                "title": "New schedule",
                "description": "Saturday classes start in April",
                "link": "https://studio.test/news",
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app.request("GET", "/api/notices/latest", None, None).await;
    assert_eq!(response.body["data"]["title"], "New schedule");
    assert_eq!(response.body["data"]["link"], "https://studio.test/news");

    let response = app
        .request("DELETE", "/api/admin/notices", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], 1);

    let response = app.request("GET", "/api/notices/latest", None, None).await;
    assert!(response.body["data"].is_null());
}

#[tokio::test]
async fn test_notice_link_must_be_url() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;

    let response = app
        .request(
            "POST",
            "/api/admin/notices",
            Some(json!({
                "title": "Title",
                "description": "Body",
                "link": "not a url",
            })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_manual_resets() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;
    let (_, token) = app.member("ana@studio.test", 1, true).await;
    app.assign(&token, json!([slot("monday", "08:00")])).await;
    app.assign(&token, json!([slot("tuesday", "08:00")])).await;

    let response = app
        .request(
            "POST",
            "/api/admin/maintenance/weekly-reset",
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["task"], "weekly_reset");
    assert_eq!(response.body["data"]["overrides_cleared"], 1);

    let response = app
        .request(
            "POST",
            "/api/admin/maintenance/monthly-reset",
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["task"], "monthly_reset");

    let schedule = app
        .request("GET", "/api/schedule/me", None, Some(&token))
        .await;
    let data = &schedule.body["data"];
    assert_eq!(data["effective_selections"], json!([slot("monday", "08:00")]));
    assert_eq!(data["changes_this_month"], 0);
    assert_eq!(data["paid"], false);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], "memory");
}
