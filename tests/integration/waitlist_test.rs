//! Integration tests for the waitlist and automatic promotion.

mod helpers;

use axum::http::StatusCode;
use enrollhub_entity::class::ClassStatus;
use enrollhub_entity::enrollment::AUTO_ENROLL_NOTE;

#[tokio::test]
async fn test_withdrawal_promotes_next_waiting_student() {
    let app = helpers::TestApp::new();
    let class = app.open_class(2).await;
    let (a, b, c) = (app.student(), app.student(), app.student());

    app.enroll(class.id, a).await;
    app.enroll(class.id, b).await;
    assert_eq!(app.class(class.id).await.status, ClassStatus::Full);

    let queued = app.join_waitlist(class.id, c, false).await;
    assert_eq!(queued.status, StatusCode::CREATED, "{:?}", queued.body);
    assert_eq!(queued.data()["position"], 1);
    assert_eq!(queued.data()["status"], "waiting");

    let outcome = app.withdraw(class.id, a).await;
    assert_eq!(outcome.status, StatusCode::OK, "{:?}", outcome.body);
    let promoted = &outcome.data()["promoted"];
    assert_eq!(promoted["enrollment"]["student_id"], c.to_string());
    assert_eq!(promoted["enrollment"]["notes"], AUTO_ENROLL_NOTE);
    assert!(promoted["enrollment"]["enrolled_by"].is_null());
    assert_eq!(promoted["entry"]["status"], "enrolled");

    let class = app.class(class.id).await;
    assert_eq!(class.current_enrollment, 2);
    assert_eq!(class.status, ClassStatus::Full);

    let waitlist = app
        .request("GET", &format!("/api/classes/{}/waitlist", class.id), None)
        .await;
    assert_eq!(waitlist.data().as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_priority_entries_served_first() {
    let app = helpers::TestApp::new();
    let class = app.open_class(1).await;
    let holder = app.student();
    let (early, vip) = (app.student(), app.student());

    app.enroll(class.id, holder).await;
    app.join_waitlist(class.id, early, false).await;
    app.join_waitlist(class.id, vip, true).await;

    let position = app
        .request(
            "GET",
            &format!("/api/classes/{}/waitlist/{}", class.id, vip),
            None,
        )
        .await;
    assert_eq!(position.status, StatusCode::OK);
    assert_eq!(position.data()["rank"], 1);
    assert_eq!(position.data()["queue_length"], 2);
    assert_eq!(position.data()["entry"]["position"], 2);

    let outcome = app.withdraw(class.id, holder).await;
    assert_eq!(
        outcome.data()["promoted"]["enrollment"]["student_id"],
        vip.to_string()
    );

    let remaining = app
        .request(
            "GET",
            &format!("/api/classes/{}/waitlist/{}", class.id, early),
            None,
        )
        .await;
    assert_eq!(remaining.data()["rank"], 1);
    assert_eq!(remaining.data()["queue_length"], 1);
}

#[tokio::test]
async fn test_waitlist_rules() {
    let app = helpers::TestApp::new();
    let class = app.open_class(1).await;
    let disabled = app.class_with(1, |c| c.waitlist_enabled = false).await;
    let (enrolled, waiting) = (app.student(), app.student());

    app.enroll(class.id, enrolled).await;

    let already_enrolled = app.join_waitlist(class.id, enrolled, false).await;
    assert_eq!(already_enrolled.status, StatusCode::CONFLICT);
    assert_eq!(already_enrolled.error_code(), "ALREADY_ENROLLED");

    assert_eq!(
        app.join_waitlist(class.id, waiting, false).await.status,
        StatusCode::CREATED
    );
    let duplicate = app.join_waitlist(class.id, waiting, true).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.error_code(), "ALREADY_WAITLISTED");

    let off = app.join_waitlist(disabled.id, app.student(), false).await;
    assert_eq!(off.status, StatusCode::BAD_REQUEST);
    assert_eq!(off.error_code(), "WAITLIST_DISABLED");
}

#[tokio::test]
async fn test_position_of_student_not_waiting() {
    let app = helpers::TestApp::new();
    let class = app.open_class(1).await;

    let response = app
        .request(
            "GET",
            &format!("/api/classes/{}/waitlist/{}", class.id, app.student()),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "WAITLIST_ENTRY_NOT_FOUND");
}

#[tokio::test]
async fn test_without_auto_enroll_the_class_reopens() {
    let app = helpers::TestApp::new();
    let class = app
        .class_with(1, |c| c.auto_enroll_from_waitlist = false)
        .await;
    let (holder, waiting) = (app.student(), app.student());

    app.enroll(class.id, holder).await;
    app.join_waitlist(class.id, waiting, false).await;

    let outcome = app.withdraw(class.id, holder).await;
    assert_eq!(outcome.status, StatusCode::OK);
    assert!(outcome.data()["promoted"].is_null());

    let class = app.class(class.id).await;
    assert_eq!(class.current_enrollment, 0);
    assert_eq!(class.status, ClassStatus::OpenForEnrollment);

    let queue = app
        .request("GET", &format!("/api/classes/{}/waitlist", class.id), None)
        .await;
    assert_eq!(queue.data().as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_direct_enrollment_clears_waiting_entry() {
    let app = helpers::TestApp::new();
    let class = app.open_class(2).await;
    let student = app.student();

    app.join_waitlist(class.id, student, false).await;
    assert_eq!(app.enroll(class.id, student).await.status, StatusCode::CREATED);

    let queue = app
        .request("GET", &format!("/api/classes/{}/waitlist", class.id), None)
        .await;
    assert_eq!(queue.data().as_array().map(Vec::len), Some(0));
}
