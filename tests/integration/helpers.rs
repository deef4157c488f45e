//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use enrollhub_api::{AppState, build_app};
use enrollhub_core::config::AppConfig;
use enrollhub_core::types::id::{ClassId, OrganizationId, StudentId};
use enrollhub_database::{AdmissionStore, MemoryAdmissionStore, MemoryStudentDirectory};
use enrollhub_entity::class::{Class, NewClass};
use enrollhub_service::events::EventBus;

/// Test application over the in-memory backend
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Store shared with the router, for seeding classes
    pub store: Arc<MemoryAdmissionStore>,
    /// Directory shared with the router, for seeding students
    pub directory: MemoryStudentDirectory,
    /// Event bus the services publish to
    pub bus: EventBus,
    /// Organization used by `request`
    pub org: OrganizationId,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let store = Arc::new(MemoryAdmissionStore::new());
        let directory = MemoryStudentDirectory::new();
        let bus = EventBus::new(256);

        let state = AppState::new(
            AppConfig::in_memory(),
            store.clone(),
            "memory",
            Arc::new(directory.clone()),
            Arc::new(bus.clone()),
        );

        Self {
            router: build_app(state),
            store,
            directory,
            bus,
            org: OrganizationId::new(),
        }
    }

    /// Register a student in the test organization
    pub fn student(&self) -> StudentId {
        let id = StudentId::new();
        self.directory.register(self.org, id);
        id
    }

    /// Seed an open class with waitlist and auto-promotion enabled
    pub async fn open_class(&self, max_capacity: i32) -> Class {
        self.class_with(max_capacity, |_| {}).await
    }

    /// Seed a class, adjusting the defaults first
    pub async fn class_with(&self, max_capacity: i32, configure: impl FnOnce(&mut NewClass)) -> Class {
        let mut new_class = NewClass::open(self.org, "Intro to Pottery", max_capacity);
        configure(&mut new_class);
        self.store
            .create_class(new_class)
            .await
            .expect("Failed to create class")
    }

    /// Current state of a class straight from the store
    pub async fn class(&self, id: ClassId) -> Class {
        self.store
            .find_class(id)
            .await
            .expect("Failed to load class")
            .expect("Class missing")
    }

    /// Send a request as the test organization
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        self.request_as(Some(self.org), method, path, body).await
    }

    /// Send a request with an explicit organization header (or none)
    pub async fn request_as(
        &self,
        org: Option<OrganizationId>,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("x-actor-id", Uuid::new_v4().to_string());

        if let Some(org) = org {
            req = req.header("x-organization-id", org.to_string());
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// POST an enrollment
    pub async fn enroll(&self, class_id: ClassId, student_id: StudentId) -> TestResponse {
        self.request(
            "POST",
            &format!("/api/classes/{class_id}/enrollments"),
            Some(serde_json::json!({ "student_id": student_id })),
        )
        .await
    }

    /// POST a withdrawal without a body
    pub async fn withdraw(&self, class_id: ClassId, student_id: StudentId) -> TestResponse {
        self.request(
            "POST",
            &format!("/api/classes/{class_id}/enrollments/{student_id}/withdraw"),
            None,
        )
        .await
    }

    /// POST a waitlist entry
    pub async fn join_waitlist(
        &self,
        class_id: ClassId,
        student_id: StudentId,
        is_priority: bool,
    ) -> TestResponse {
        self.request(
            "POST",
            &format!("/api/classes/{class_id}/waitlist"),
            Some(serde_json::json!({ "student_id": student_id, "is_priority": is_priority })),
        )
        .await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` payload of a success response
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The machine-readable code of an error response
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
