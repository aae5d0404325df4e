mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::register_user;

test_with_server!(csv_export_contains_month_entries, |server, ctx_state| {
    register_user(&server, "alice@example.com", "Alice", false).await;

    server
        .post("/api/entries")
        .json(&json!({
            "week_start": "2025-01-20",
            "hours": 2.5,
            "tags": ["dev", "design"],
            "note": "said \"hi\", twice",
        }))
        .await
        .assert_status_success();
    // outside the requested month
    server
        .post("/api/entries")
        .json(&json!({ "week_start": "2025-02-10", "hours": 1.0 }))
        .await
        .assert_status_success();

    let response = server.get("/api/exports/entries.csv?month=2025-01").await;
    response.assert_status_success();
    assert_eq!(response.header("content-type"), "text/csv; charset=utf-8");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"entries_2025-01.csv\""
    );

    let body = response.text();
    assert!(body.starts_with('\u{feff}'));
    let lines: Vec<&str> = body.trim_end().lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("\"2025-01-20\""));
    assert!(lines[1].contains("\"dev;design\""));
    assert!(lines[1].contains("\"said \"\"hi\"\", twice\""));
    assert!(lines[1].contains("\"Alice\""));
    assert!(lines[1].contains("\"alice@example.com\""));
    assert!(!body.contains("2025-02-10"));
});

test_with_server!(csv_export_rejects_bad_month, |server, ctx_state| {
    register_user(&server, "alice@example.com", "Alice", false).await;
    server
        .get("/api/exports/entries.csv?month=january")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/api/exports/entries.csv?month=2025-13")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
});

test_with_server!(csv_export_requires_login, |server, ctx_state| {
    server
        .get("/api/exports/entries.csv?month=2025-01")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
});

test_with_server!(asana_proxy_reports_not_configured, |server, ctx_state| {
    register_user(&server, "alice@example.com", "Alice", false).await;
    let response = server
        .post("/api/integrations/tasks")
        .json(&json!({ "name": "Follow up with design" }))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.text().contains("not configured"));
});
