//! Integration tests for direct enrollment, withdrawal, and class administration.

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use enrollhub_core::types::id::{ClassId, OrganizationId, StudentId};
use enrollhub_entity::class::ClassStatus;

#[tokio::test]
async fn test_enroll_takes_a_seat() {
    let app = helpers::TestApp::new();
    let class = app.open_class(3).await;
    let student = app.student();

    let response = app.enroll(class.id, student).await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data()["status"], "active");
    assert_eq!(response.data()["student_id"], student.to_string());

    let capacity = app
        .request("GET", &format!("/api/classes/{}/capacity", class.id), None)
        .await;
    assert_eq!(capacity.status, StatusCode::OK);
    assert_eq!(capacity.data()["current_enrollment"], 1);
    assert_eq!(capacity.data()["available_seats"], 2);
    assert_eq!(capacity.data()["status"], "open_for_enrollment");
}

#[tokio::test]
async fn test_last_seat_fills_class() {
    let app = helpers::TestApp::new();
    let class = app.open_class(1).await;

    let first = app.enroll(class.id, app.student()).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(app.class(class.id).await.status, ClassStatus::Full);

    let second = app.enroll(class.id, app.student()).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.error_code(), "CLASS_FULL");
    assert_eq!(app.class(class.id).await.current_enrollment, 1);
}

#[tokio::test]
async fn test_duplicate_enrollment_rejected() {
    let app = helpers::TestApp::new();
    let class = app.open_class(5).await;
    let student = app.student();

    assert_eq!(app.enroll(class.id, student).await.status, StatusCode::CREATED);

    let again = app.enroll(class.id, student).await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.error_code(), "ALREADY_ENROLLED");
    assert_eq!(app.class(class.id).await.current_enrollment, 1);
}

#[tokio::test]
async fn test_unknown_student_and_class() {
    let app = helpers::TestApp::new();
    let class = app.open_class(5).await;

    let stranger = app.enroll(class.id, StudentId::new()).await;
    assert_eq!(stranger.status, StatusCode::NOT_FOUND);
    assert_eq!(stranger.error_code(), "STUDENT_NOT_FOUND");

    let missing = app.enroll(ClassId::new(), app.student()).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.error_code(), "CLASS_NOT_FOUND");
}

#[tokio::test]
async fn test_classes_are_scoped_to_organization() {
    let app = helpers::TestApp::new();
    let class = app.open_class(5).await;

    let response = app
        .request_as(
            Some(OrganizationId::new()),
            "GET",
            &format!("/api/classes/{}/roster", class.id),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "CLASS_NOT_FOUND");

    let anonymous = app
        .request_as(None, "GET", &format!("/api/classes/{}/roster", class.id), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::BAD_REQUEST);
    assert_eq!(anonymous.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_class_id() {
    let app = helpers::TestApp::new();

    let response = app
        .request("GET", "/api/classes/not-a-uuid/capacity", None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_closed_statuses_reject_enrollment() {
    let app = helpers::TestApp::new();
    let draft = app
        .class_with(5, |c| c.status = ClassStatus::Draft)
        .await;
    let cancelled = app
        .class_with(5, |c| c.status = ClassStatus::Cancelled)
        .await;

    let closed = app.enroll(draft.id, app.student()).await;
    assert_eq!(closed.status, StatusCode::BAD_REQUEST);
    assert_eq!(closed.error_code(), "ENROLLMENT_CLOSED");

    let gone = app.enroll(cancelled.id, app.student()).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.error_code(), "CLASS_NOT_FOUND");
}

#[tokio::test]
async fn test_withdraw_releases_seat() {
    let app = helpers::TestApp::new();
    let class = app.open_class(1).await;
    let student = app.student();
    app.enroll(class.id, student).await;

    let response = app
        .request(
            "POST",
            &format!("/api/classes/{}/enrollments/{}/withdraw", class.id, student),
            Some(serde_json::json!({ "reason": "schedule conflict" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["withdrawn"]["status"], "withdrawn");
    assert_eq!(
        response.data()["withdrawn"]["withdrawal_reason"],
        "schedule conflict"
    );
    assert!(response.data()["promoted"].is_null());

    let class = app.class(class.id).await;
    assert_eq!(class.current_enrollment, 0);
    assert_eq!(class.status, ClassStatus::OpenForEnrollment);

    let again = app.withdraw(class.id, student).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.error_code(), "ENROLLMENT_NOT_FOUND");
}

#[tokio::test]
async fn test_reenroll_after_withdrawal() {
    let app = helpers::TestApp::new();
    let class = app.open_class(2).await;
    let student = app.student();

    app.enroll(class.id, student).await;
    assert_eq!(app.withdraw(class.id, student).await.status, StatusCode::OK);
    assert_eq!(app.enroll(class.id, student).await.status, StatusCode::CREATED);

    let roster = app
        .request("GET", &format!("/api/classes/{}/roster", class.id), None)
        .await;
    assert_eq!(roster.data().as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_status_transitions() {
    let app = helpers::TestApp::new();
    let class = app
        .class_with(5, |c| c.status = ClassStatus::Draft)
        .await;
    let path = format!("/api/classes/{}/status", class.id);

    let opened = app
        .request(
            "PUT",
            &path,
            Some(serde_json::json!({ "status": "open_for_enrollment" })),
        )
        .await;
    assert_eq!(opened.status, StatusCode::OK, "{:?}", opened.body);
    assert_eq!(opened.data()["status"], "open_for_enrollment");

    let manual_full = app
        .request("PUT", &path, Some(serde_json::json!({ "status": "full" })))
        .await;
    assert_eq!(manual_full.status, StatusCode::BAD_REQUEST);
    assert_eq!(manual_full.error_code(), "INVALID_STATUS_TRANSITION");
}

#[tokio::test]
async fn test_reconcile_reports_clean_class() {
    let app = helpers::TestApp::new();
    let class = app.open_class(2).await;
    app.enroll(class.id, app.student()).await;

    let response = app
        .request("POST", &format!("/api/classes/{}/reconcile", class.id), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["recorded"], 1);
    assert_eq!(response.data()["actual"], 1);
    assert_eq!(response.data()["drift"], 0);
}

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new();

    let response = app.request_as(None, "GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["backend"], "memory");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_enrollments_never_oversubscribe() {
    let app = Arc::new(helpers::TestApp::new());
    let class = app.open_class(10).await;
    let students: Vec<StudentId> = (0..50).map(|_| app.student()).collect();

    let class_id = class.id;
    let mut tasks = tokio::task::JoinSet::new();
    for student in students {
        let app = Arc::clone(&app);
        tasks.spawn(async move { app.enroll(class_id, student).await });
    }

    let mut created = 0;
    let mut full = 0;
    while let Some(result) = tasks.join_next().await {
        let response = result.expect("task panicked");
        match response.status {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => {
                assert_eq!(response.error_code(), "CLASS_FULL");
                full += 1;
            }
            other => panic!("unexpected status {other}: {:?}", response.body),
        }
    }

    assert_eq!(created, 10);
    assert_eq!(full, 40);

    let class = app.class(class_id).await;
    assert_eq!(class.current_enrollment, 10);
    assert_eq!(class.status, ClassStatus::Full);
}
