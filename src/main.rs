//! EnrollHub Server: class enrollment and waitlist admission control.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use enrollhub_api::{AppState, build_app, serve};
use enrollhub_core::config::AppConfig;
use enrollhub_core::error::AppError;
use enrollhub_database::{DirectoryDispatch, StoreDispatch};
use enrollhub_service::class::EnrollmentReconciler;
use enrollhub_service::events::EventBus;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    match std::env::var("ENROLLHUB_CONFIG") {
        Ok(path) => AppConfig::load_from(&path),
        Err(_) => {
            let env =
                std::env::var("ENROLLHUB_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting EnrollHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Admission store (+ migrations) ───────────────────
    tracing::info!(backend = ?config.database.backend, "Connecting admission store...");
    let store = Arc::new(StoreDispatch::connect(&config.database).await?);
    tracing::info!("Admission store ready ({})", store.backend_name());

    // ── Step 2: Student directory ────────────────────────────────
    let directory = Arc::new(DirectoryDispatch::for_store(&store));

    // ── Step 3: Event bus ────────────────────────────────────────
    let bus = Arc::new(EventBus::from_config(&config.events));
    let _event_logger = config.events.log_events.then(|| bus.spawn_logger());

    // ── Step 4: Startup reconciliation ───────────────────────────
    tracing::info!("Reconciling enrollment counters...");
    let summary = EnrollmentReconciler::new(store.clone())
        .reconcile_all()
        .await
        .map_err(AppError::from)?;
    if summary.repaired_count() > 0 || !summary.failed.is_empty() {
        tracing::warn!(
            repaired = summary.repaired_count(),
            failed = summary.failed.len(),
            "Enrollment counters needed attention"
        );
    }

    // ── Step 5: Build and start HTTP server ──────────────────────
    let server_config = config.server.clone();
    let state = AppState::new(
        config,
        store.clone(),
        store.backend_name(),
        directory,
        bus,
    );
    let app = build_app(state);

    serve(app, &server_config).await?;

    // ── Step 6: Shutdown ─────────────────────────────────────────
    let grace = Duration::from_secs(server_config.shutdown_grace_seconds);
    if tokio::time::timeout(grace, store.close()).await.is_err() {
        tracing::warn!("Timed out closing the admission store");
    }
    tracing::info!("EnrollHub stopped");

    Ok(())
}
