//! Store backend selection.

use async_trait::async_trait;
use tracing::info;

use enrollhub_core::config::{DatabaseConfig, StoreBackend};
use enrollhub_core::result::{AdmissionResult, AppResult};
use enrollhub_core::types::id::ClassId;
use enrollhub_entity::class::{Class, NewClass};
use enrollhub_entity::enrollment::Enrollment;
use enrollhub_entity::waitlist::WaitlistEntry;

use crate::connection::DatabasePool;
use crate::migration::run_migrations;

use super::memory::MemoryAdmissionStore;
use super::postgres::PgAdmissionStore;
use super::{AdmissionStore, AdmissionUnit};

/// Dispatcher for admission store implementations.
///
/// Switches between PostgreSQL and in-memory storage based on configuration.
#[derive(Debug, Clone)]
pub enum StoreDispatch {
    /// PostgreSQL store (multi-node).
    Postgres(PgAdmissionStore),
    /// In-memory store (single node, tests).
    Memory(MemoryAdmissionStore),
}

impl StoreDispatch {
    /// Build the configured backend, connecting and migrating as needed.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            StoreBackend::Postgres => {
                let db = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(db.pool()).await?;
                }
                Ok(Self::Postgres(PgAdmissionStore::new(db)))
            }
            StoreBackend::Memory => {
                info!("Using in-memory admission store");
                Ok(Self::memory())
            }
        }
    }

    /// An empty in-memory store.
    pub fn memory() -> Self {
        Self::Memory(MemoryAdmissionStore::new())
    }

    /// Human-readable backend name.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// Close pooled connections, if any.
    pub async fn close(&self) {
        if let Self::Postgres(inner) = self {
            inner.database().close().await;
        }
    }
}

#[async_trait]
impl AdmissionStore for StoreDispatch {
    async fn begin(&self, class_id: ClassId) -> AdmissionResult<Box<dyn AdmissionUnit>> {
        match self {
            Self::Postgres(inner) => inner.begin(class_id).await,
            Self::Memory(inner) => inner.begin(class_id).await,
        }
    }

    async fn find_class(&self, class_id: ClassId) -> AppResult<Option<Class>> {
        match self {
            Self::Postgres(inner) => inner.find_class(class_id).await,
            Self::Memory(inner) => inner.find_class(class_id).await,
        }
    }

    async fn create_class(&self, new_class: NewClass) -> AppResult<Class> {
        match self {
            Self::Postgres(inner) => inner.create_class(new_class).await,
            Self::Memory(inner) => inner.create_class(new_class).await,
        }
    }

    async fn list_class_ids(&self) -> AppResult<Vec<ClassId>> {
        match self {
            Self::Postgres(inner) => inner.list_class_ids().await,
            Self::Memory(inner) => inner.list_class_ids().await,
        }
    }

    async fn list_roster(&self, class_id: ClassId) -> AppResult<Vec<Enrollment>> {
        match self {
            Self::Postgres(inner) => inner.list_roster(class_id).await,
            Self::Memory(inner) => inner.list_roster(class_id).await,
        }
    }

    async fn list_waiting(&self, class_id: ClassId) -> AppResult<Vec<WaitlistEntry>> {
        match self {
            Self::Postgres(inner) => inner.list_waiting(class_id).await,
            Self::Memory(inner) => inner.list_waiting(class_id).await,
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        match self {
            Self::Postgres(inner) => inner.health_check().await,
            Self::Memory(inner) => inner.health_check().await,
        }
    }
}
