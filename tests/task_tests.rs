mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use timebank_server::entities::task::task_entity::{Task, TaskStatus};
use timebank_server::services::task_service::TaskWithApplications;

use crate::helpers::create_login_test_user;

async fn create_task(server: &axum_test::TestServer, title: &str) -> Task {
    let response = server
        .post("/api/tasks")
        .json(&json!({ "title": title, "description": "help wanted", "tags": ["Dev"] }))
        .await;
    response.assert_status_success();
    response.json::<Task>()
}

test_with_server!(create_task_starts_open_with_normalized_tags, |server, ctx_state| {
    create_login_test_user(&server, "Rika").await;
    let task = create_task(&server, "Review onboarding docs").await;
    assert_eq!(task.status, TaskStatus::Open);
    assert_eq!(task.tags, vec!["dev".to_string()]);
});

test_with_server!(task_title_is_required, |server, ctx_state| {
    create_login_test_user(&server, "Rika").await;
    server
        .post("/api/tasks")
        .json(&json!({ "title": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
});

test_with_server!(requester_walks_the_happy_path, |server, ctx_state| {
    create_login_test_user(&server, "Rika").await;
    let task = create_task(&server, "Ship exporter").await;
    let task_id = task.id.unwrap().to_raw();

    for status in ["in_progress", "completed"] {
        let response = server
            .post(&format!("/api/tasks/{task_id}/status"))
            .json(&json!({ "status": status }))
            .await;
        response.assert_status_success();
    }

    // completed is terminal
    let response = server
        .post(&format!("/api/tasks/{task_id}/status"))
        .json(&json!({ "status": "open" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().contains("Invalid status transition"));
});

test_with_server!(cancelled_task_can_reopen, |server, ctx_state| {
    create_login_test_user(&server, "Rika").await;
    let task = create_task(&server, "Maybe later").await;
    let task_id = task.id.unwrap().to_raw();

    for status in ["cancelled", "open"] {
        server
            .post(&format!("/api/tasks/{task_id}/status"))
            .json(&json!({ "status": status }))
            .await
            .assert_status_success();
    }
});

test_with_server!(only_requester_drives_the_state_machine, |server, ctx_state| {
    create_login_test_user(&server, "Rika").await;
    let task = create_task(&server, "Guarded").await;
    let task_id = task.id.unwrap().to_raw();

    create_login_test_user(&server, "Eve").await;
    server
        .post(&format!("/api/tasks/{task_id}/status"))
        .json(&json!({ "status": "in_progress" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    server
        .delete(&format!("/api/tasks/{task_id}"))
        .await
        .assert_status(StatusCode::FORBIDDEN);
});

test_with_server!(soft_deleted_task_disappears, |server, ctx_state| {
    create_login_test_user(&server, "Rika").await;
    let task = create_task(&server, "Short lived").await;
    let task_id = task.id.unwrap().to_raw();

    server
        .delete(&format!("/api/tasks/{task_id}"))
        .await
        .assert_status_success();

    server
        .get(&format!("/api/tasks/{task_id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    let listed = server.get("/api/tasks").await.json::<Vec<Task>>();
    assert!(listed.iter().all(|t| t.id.as_ref().unwrap().to_raw() != task_id));
});

test_with_server!(duplicate_application_conflicts, |server, ctx_state| {
    create_login_test_user(&server, "Rika").await;
    let task = create_task(&server, "Open seat").await;
    let task_id = task.id.unwrap().to_raw();

    create_login_test_user(&server, "Ken").await;
    server
        .post(&format!("/api/tasks/{task_id}/apply"))
        .await
        .assert_status_success();

    let duplicate = server.post(&format!("/api/tasks/{task_id}/apply")).await;
    duplicate.assert_status(StatusCode::CONFLICT);
    assert!(duplicate.text().contains("Already applied"));
});

test_with_server!(requester_cannot_apply_to_own_task, |server, ctx_state| {
    create_login_test_user(&server, "Rika").await;
    let task = create_task(&server, "Self service").await;
    let task_id = task.id.unwrap().to_raw();

    server
        .post(&format!("/api/tasks/{task_id}/apply"))
        .await
        .assert_status(StatusCode::FORBIDDEN);
});

test_with_server!(withdraw_then_reapply_succeeds, |server, ctx_state| {
    create_login_test_user(&server, "Rika").await;
    let task = create_task(&server, "Revolving door").await;
    let task_id = task.id.unwrap().to_raw();

    create_login_test_user(&server, "Ken").await;
    let application = server
        .post(&format!("/api/tasks/{task_id}/apply"))
        .await
        .json::<serde_json::Value>();
    let detail = server
        .get(&format!("/api/tasks/{task_id}"))
        .await
        .json::<TaskWithApplications>();
    assert_eq!(detail.applications.len(), 1);
    let application_id = detail.applications[0].id.as_ref().unwrap().to_raw();
    assert_eq!(application["status"], "applied");

    server
        .post(&format!("/api/applications/{application_id}/withdraw"))
        .await
        .assert_status_success();

    let reapplied = server.post(&format!("/api/tasks/{task_id}/apply")).await;
    reapplied.assert_status_success();
    assert_eq!(reapplied.json::<serde_json::Value>()["status"], "applied");

    // still one row per (task, applicant)
    let detail = server
        .get(&format!("/api/tasks/{task_id}"))
        .await
        .json::<TaskWithApplications>();
    assert_eq!(detail.applications.len(), 1);
});

test_with_server!(closed_task_rejects_applications, |server, ctx_state| {
    create_login_test_user(&server, "Rika").await;
    let task = create_task(&server, "Done deal").await;
    let task_id = task.id.unwrap().to_raw();
    server
        .post(&format!("/api/tasks/{task_id}/status"))
        .json(&json!({ "status": "completed" }))
        .await
        .assert_status_success();

    create_login_test_user(&server, "Ken").await;
    server
        .post(&format!("/api/tasks/{task_id}/apply"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
});
