//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use enrollhub_core::config::AppConfig;
use enrollhub_core::traits::{EventPublisher, StudentDirectory};
use enrollhub_database::store::AdmissionStore;
use enrollhub_service::admission::AdmissionController;
use enrollhub_service::class::{ClassLifecycleService, EnrollmentReconciler};
use enrollhub_service::roster::RosterService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Admission store (PostgreSQL or in-memory)
    pub store: Arc<dyn AdmissionStore>,
    /// Name of the active store backend, reported by health checks
    pub backend: &'static str,
    /// Process start, for uptime reporting
    pub started_at: Instant,

    // ── Services ─────────────────────────────────────────────
    /// Enroll, withdraw, and waitlist operations
    pub admission: Arc<AdmissionController>,
    /// Read-only roster and queue queries
    pub roster: Arc<RosterService>,
    /// Manual status transitions
    pub lifecycle: Arc<ClassLifecycleService>,
    /// Counter drift repair
    pub reconciler: Arc<EnrollmentReconciler>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.backend)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire every service over the given collaborators.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn AdmissionStore>,
        backend: &'static str,
        directory: Arc<dyn StudentDirectory>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        let admission = AdmissionController::new(
            Arc::clone(&store),
            directory,
            Arc::clone(&events),
        );
        let roster = RosterService::new(Arc::clone(&store));
        let lifecycle = ClassLifecycleService::new(Arc::clone(&store), events);
        let reconciler = EnrollmentReconciler::new(Arc::clone(&store));

        Self {
            config: Arc::new(config),
            store,
            backend,
            started_at: Instant::now(),
            admission: Arc::new(admission),
            roster: Arc::new(roster),
            lifecycle: Arc::new(lifecycle),
            reconciler: Arc::new(reconciler),
        }
    }
}
