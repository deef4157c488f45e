//! Admission round trips against a real PostgreSQL database.
//!
//! Skipped unless `ENROLLHUB_TEST_DATABASE_URL` points at a scratch database.

use std::sync::Arc;

use enrollhub_core::config::DatabaseConfig;
use enrollhub_core::error::AdmissionError;
use enrollhub_core::types::id::{OrganizationId, StudentId};
use enrollhub_database::migration::run_migrations;
use enrollhub_database::{AdmissionStore, DatabasePool, PgAdmissionStore, PgStudentDirectory};
use enrollhub_entity::class::{ClassStatus, NewClass};
use enrollhub_entity::enrollment::EnrollmentTerms;
use enrollhub_entity::waitlist::NewWaitlistEntry;
use enrollhub_service::admission::AdmissionController;
use enrollhub_service::class::EnrollmentReconciler;
use enrollhub_service::context::RequestContext;
use enrollhub_service::events::EventBus;

struct PgHarness {
    store: Arc<PgAdmissionStore>,
    directory: PgStudentDirectory,
    controller: AdmissionController,
    ctx: RequestContext,
}

impl PgHarness {
    async fn connect() -> Option<Self> {
        let url = std::env::var("ENROLLHUB_TEST_DATABASE_URL").ok()?;
        let config = DatabaseConfig {
            url,
            max_connections: 30,
            ..DatabaseConfig::default()
        };

        let db = DatabasePool::connect(&config)
            .await
            .expect("Failed to connect to test database");
        run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let directory = PgStudentDirectory::new(db.pool().clone());
        let store = Arc::new(PgAdmissionStore::new(db));
        let controller = AdmissionController::new(
            store.clone(),
            Arc::new(directory.clone()),
            Arc::new(EventBus::new(64)),
        );

        Some(Self {
            store,
            directory,
            controller,
            ctx: RequestContext::new(OrganizationId::new(), None),
        })
    }

    async fn student(&self) -> StudentId {
        let id = StudentId::new();
        self.directory
            .register(self.ctx.organization_id, id, "Test Student")
            .await
            .expect("Failed to register student");
        id
    }
}

#[tokio::test]
async fn test_enroll_waitlist_and_promote() {
    let Some(h) = PgHarness::connect().await else {
        return;
    };

    let class = h
        .store
        .create_class(NewClass::open(h.ctx.organization_id, "Evening Welding", 1))
        .await
        .unwrap();
    let (holder, waiting) = (h.student().await, h.student().await);

    h.controller
        .enroll(&h.ctx, class.id, holder, EnrollmentTerms::default())
        .await
        .unwrap();
    let full = h.store.find_class(class.id).await.unwrap().unwrap();
    assert_eq!(full.status, ClassStatus::Full);
    assert_eq!(full.current_enrollment, 1);

    let entry = h
        .controller
        .add_to_waitlist(&h.ctx, class.id, waiting, NewWaitlistEntry::default())
        .await
        .unwrap();
    assert_eq!(entry.position, 1);

    let duplicate = h
        .controller
        .add_to_waitlist(&h.ctx, class.id, waiting, NewWaitlistEntry::default())
        .await;
    assert!(matches!(
        duplicate,
        Err(AdmissionError::AlreadyWaitlisted { .. })
    ));

    let outcome = h
        .controller
        .withdraw(&h.ctx, class.id, holder, Some("moved".into()))
        .await
        .unwrap();
    let promoted = outcome.promoted.expect("waiting student should be promoted");
    assert_eq!(promoted.enrollment.student_id, waiting);

    let after = h.store.find_class(class.id).await.unwrap().unwrap();
    assert_eq!(after.current_enrollment, 1);
    assert_eq!(after.status, ClassStatus::Full);
    assert!(h.store.list_waiting(class.id).await.unwrap().is_empty());

    let report = EnrollmentReconciler::new(h.store.clone())
        .reconcile_class(class.id)
        .await
        .unwrap();
    assert_eq!(report.drift, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_enrollments_respect_capacity() {
    let Some(h) = PgHarness::connect().await else {
        return;
    };

    let class = h
        .store
        .create_class(NewClass::open(h.ctx.organization_id, "Crowded Lecture", 5))
        .await
        .unwrap();

    let mut students = Vec::new();
    for _ in 0..20 {
        students.push(h.student().await);
    }

    let class_id = class.id;
    let controller = Arc::new(h.controller.clone());
    let mut tasks = tokio::task::JoinSet::new();
    for student in students {
        let controller = Arc::clone(&controller);
        let ctx = h.ctx.clone();
        tasks.spawn(async move {
            controller
                .enroll(&ctx, class_id, student, EnrollmentTerms::default())
                .await
        });
    }

    let mut admitted = 0;
    while let Some(result) = tasks.join_next().await {
        match result.expect("task panicked") {
            Ok(_) => admitted += 1,
            Err(AdmissionError::ClassFull(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(admitted, 5);
    let class = h.store.find_class(class_id).await.unwrap().unwrap();
    assert_eq!(class.current_enrollment, 5);
    assert_eq!(class.status, ClassStatus::Full);
}
