//! Shared fixture for service tests.

use std::sync::Arc;

use uuid::Uuid;

use enrollhub_core::types::id::{ClassId, OrganizationId, StudentId};
use enrollhub_database::directory::MemoryStudentDirectory;
use enrollhub_database::store::{AdmissionStore, MemoryAdmissionStore};
use enrollhub_entity::class::{Class, NewClass};

use crate::admission::AdmissionController;
use crate::context::RequestContext;
use crate::events::EventBus;

/// One organization with an in-memory store and directory.
pub(crate) struct Fixture {
    pub store: Arc<MemoryAdmissionStore>,
    pub directory: MemoryStudentDirectory,
    pub bus: EventBus,
    pub controller: AdmissionController,
    pub ctx: RequestContext,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryAdmissionStore::new());
        let directory = MemoryStudentDirectory::new();
        let bus = EventBus::new(64);
        let controller = AdmissionController::new(
            store.clone(),
            Arc::new(directory.clone()),
            Arc::new(bus.clone()),
        );
        let ctx = RequestContext::new(OrganizationId::new(), Some(Uuid::new_v4()));

        Self {
            store,
            directory,
            bus,
            controller,
            ctx,
        }
    }

    /// Register a new student in the fixture's organization.
    pub fn student(&self) -> StudentId {
        let id = StudentId::new();
        self.directory.register(self.ctx.organization_id, id);
        id
    }

    /// An open class with waitlist and auto-promotion enabled.
    pub async fn open_class(&self, max_capacity: i32) -> Class {
        self.class_with(max_capacity, |_| {}).await
    }

    pub async fn class_with(&self, max_capacity: i32, configure: impl FnOnce(&mut NewClass)) -> Class {
        let mut new_class = NewClass::open(self.ctx.organization_id, "Test Class", max_capacity);
        configure(&mut new_class);
        self.store.create_class(new_class).await.unwrap()
    }

    /// Current committed state of a class.
    pub async fn class(&self, id: ClassId) -> Class {
        self.store.find_class(id).await.unwrap().unwrap()
    }
}
