mod helpers;

use serde_json::json;
use timebank_server::services::aggregation::{AxisTrend, KpiStats, TagHours, WeekHours};
use timebank_server::services::dashboard_service::{LeaderboardRow, RecentEntryView};

use crate::helpers::{create_login_test_user, current_month_key, register_user};

test_with_server!(kpi_is_all_zeros_without_activity, |server, ctx_state| {
    create_login_test_user(&server, "Alice").await;

    let stats = server.get("/api/dashboard/kpi").await.json::<KpiStats>();
    assert_eq!(stats.provided_hours, 0.0);
    assert_eq!(stats.received_hours, 0.0);
    assert_eq!(stats.balance_hours, 0.0);
    assert_eq!(stats.balance_label, "balanced");
    assert_eq!(stats.avg_rating, 0.0);
    assert_eq!(stats.collaborator_count, 0);
});

test_with_server!(kpi_reflects_provided_and_received_hours, |server, ctx_state| {
    let bob = register_user(&server, "bob@example.com", "Bob", false).await;
    let bob_id = bob.id.unwrap().to_raw();
    register_user(&server, "alice@example.com", "Alice", false).await;

    server
        .post("/api/entries")
        .json(&json!({
            "week_start": "2025-01-20",
            "hours": 5.0,
            "recipients": [{ "id": bob_id, "recipient_type": "user" }],
        }))
        .await
        .assert_status_success();

    let stats = server.get("/api/dashboard/kpi").await.json::<KpiStats>();
    assert_eq!(stats.provided_hours, 5.0);
    assert_eq!(stats.received_hours, 0.0);
    assert_eq!(stats.balance_label, "surplus provided");
    assert_eq!(stats.collaborator_count, 1);

    // the other side of the same entry
    register_user(&server, "bob@example.com", "Bob", false).await;
    let stats = server.get("/api/dashboard/kpi").await.json::<KpiStats>();
    assert_eq!(stats.provided_hours, 0.0);
    assert_eq!(stats.received_hours, 5.0);
    assert_eq!(stats.balance_label, "surplus received");
    assert_eq!(stats.collaborator_count, 1);
});

test_with_server!(weekly_series_sums_per_week_newest_first, |server, ctx_state| {
    create_login_test_user(&server, "Alice").await;
    for (week, hours) in [("2025-01-06", 2.0), ("2025-01-08", 1.0), ("2025-01-13", 4.0)] {
        server
            .post("/api/entries")
            .json(&json!({ "week_start": week, "hours": hours }))
            .await
            .assert_status_success();
    }

    let rows = server
        .get("/api/dashboard/weekly")
        .await
        .json::<Vec<WeekHours>>();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].week_start, "2025-01-13");
    assert_eq!(rows[0].hours, 4.0);
    assert_eq!(rows[1].week_start, "2025-01-06");
    assert_eq!(rows[1].hours, 3.0);
});

test_with_server!(tag_distribution_credits_full_hours, |server, ctx_state| {
    create_login_test_user(&server, "Alice").await;
    server
        .post("/api/entries")
        .json(&json!({ "week_start": "2025-01-20", "hours": 3.0, "tags": ["dev", "design"] }))
        .await
        .assert_status_success();
    server
        .post("/api/entries")
        .json(&json!({ "week_start": "2025-01-20", "hours": 2.0, "tags": ["dev"] }))
        .await
        .assert_status_success();

    let rows = server
        .get("/api/dashboard/tags")
        .await
        .json::<Vec<TagHours>>();
    assert_eq!(rows[0].tag, "dev");
    assert_eq!(rows[0].hours, 5.0);
    assert_eq!(rows[1].tag, "design");
    assert_eq!(rows[1].hours, 3.0);
});

test_with_server!(leaderboards_read_monthly_value_scores, |server, ctx_state| {
    let bob = register_user(&server, "bob@example.com", "Bob", false).await;
    let alice = register_user(&server, "alice@example.com", "Alice", false).await;
    let month = current_month_key();

    for (user, total_hours, value_score) in [
        (bob.id.as_ref().unwrap().to_raw(), 20.0, 8.0),
        (alice.id.as_ref().unwrap().to_raw(), 10.0, 30.0),
    ] {
        server
            .post("/test/api/value-scores")
            .json(&json!({
                "user_id": user,
                "month": month,
                "total_hours": total_hours,
                "avg_rating": 3.0,
                "feedback_count": 4,
                "value_score": value_score,
            }))
            .await
            .assert_status_success();
    }

    let by_hours = server
        .get("/api/dashboard/top-contributors")
        .await
        .json::<Vec<LeaderboardRow>>();
    assert_eq!(by_hours[0].display_name, "Bob");
    assert_eq!(by_hours[1].display_name, "Alice");

    let by_value = server
        .get("/api/dashboard/top-value")
        .await
        .json::<Vec<LeaderboardRow>>();
    assert_eq!(by_value[0].display_name, "Alice");
    assert_eq!(by_value[1].display_name, "Bob");
});

test_with_server!(evaluation_trends_cover_every_axis, |server, ctx_state| {
    let bob = register_user(&server, "bob@example.com", "Bob", false).await;
    let bob_id = bob.id.unwrap().to_raw();
    register_user(&server, "alice@example.com", "Alice", false).await;

    server
        .post("/api/entries")
        .json(&json!({
            "week_start": "2025-01-20",
            "hours": 2.0,
            "recipients": [{ "id": bob_id, "recipient_type": "user" }],
            "evaluations": [
                { "evaluated": bob_id, "axis_key": "support", "score": 4 },
                { "evaluated": bob_id, "axis_key": "mentoring", "score": 5 },
            ],
        }))
        .await
        .assert_status_success();

    register_user(&server, "bob@example.com", "Bob", false).await;
    let rows = server
        .get("/api/dashboard/evaluation-trends")
        .await
        .json::<Vec<AxisTrend>>();
    assert_eq!(rows.len(), 10);
    let support = rows.iter().find(|r| r.axis_key == "support").unwrap();
    assert_eq!(support.avg_score, 4.0);
    assert_eq!(support.count, 1);
    let mentoring = rows.iter().find(|r| r.axis_key == "mentoring").unwrap();
    assert_eq!(mentoring.avg_score, 5.0);
    let silent = rows.iter().find(|r| r.axis_key == "new_world").unwrap();
    assert_eq!(silent.avg_score, 0.0);
    assert_eq!(silent.count, 0);
});

test_with_server!(kpi_avg_rating_follows_evaluations, |server, ctx_state| {
    let bob = register_user(&server, "bob@example.com", "Bob", false).await;
    let bob_id = bob.id.unwrap().to_raw();
    register_user(&server, "alice@example.com", "Alice", false).await;

    server
        .post("/api/entries")
        .json(&json!({
            "week_start": "2025-01-20",
            "hours": 1.0,
            "recipients": [{ "id": bob_id, "recipient_type": "user" }],
            "evaluations": [
                { "evaluated": bob_id, "axis_key": "support", "score": 4 },
                { "evaluated": bob_id, "axis_key": "mentoring", "score": 5 },
            ],
        }))
        .await
        .assert_status_success();

    register_user(&server, "bob@example.com", "Bob", false).await;
    let stats = server.get("/api/dashboard/kpi").await.json::<KpiStats>();
    assert_eq!(stats.avg_rating, 4.5);
});

test_with_server!(recent_feed_carries_contributor_names, |server, ctx_state| {
    create_login_test_user(&server, "Alice").await;
    server
        .post("/api/entries")
        .json(&json!({ "week_start": "2025-01-20", "hours": 1.0, "note": "latest" }))
        .await
        .assert_status_success();

    let rows = server
        .get("/api/dashboard/recent")
        .await
        .json::<Vec<RecentEntryView>>();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].contributor_name, "Alice");
    assert_eq!(rows[0].note, "latest");
});

test_with_server!(quarterly_summary_is_null_then_filled, |server, ctx_state| {
    create_login_test_user(&server, "Alice").await;

    let empty = server.get("/api/dashboard/quarterly").await;
    empty.assert_status_success();
    assert_eq!(empty.json::<serde_json::Value>(), serde_json::Value::Null);

    server
        .post("/api/reflections")
        .json(&json!({
            "quarter": "2025-Q1",
            "reflection": "Focused too much on firefighting.",
            "actions": ["block focus time", "delegate reviews"],
        }))
        .await
        .assert_status_success();

    let summary = server
        .get("/api/dashboard/quarterly")
        .await
        .json::<serde_json::Value>();
    assert_eq!(summary["quarter"], "2025-Q1");
    assert_eq!(summary["actions"].as_array().unwrap().len(), 2);
});

test_with_server!(reflection_rejects_bad_quarter, |server, ctx_state| {
    create_login_test_user(&server, "Alice").await;
    server
        .post("/api/reflections")
        .json(&json!({ "quarter": "2025-5", "reflection": "nope" }))
        .await
        .assert_status(axum::http::StatusCode::BAD_REQUEST);
});
