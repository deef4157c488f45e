//! CLI command definitions and dispatch.

pub mod class;
pub mod migrate;
pub mod reconcile;

use std::str::FromStr;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use enrollhub_core::config::AppConfig;
use enrollhub_core::error::AppError;
use enrollhub_database::StoreDispatch;

/// EnrollHub: class enrollment and waitlist administration
#[derive(Debug, Parser)]
#[command(name = "enrollhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Recount enrollment counters and repair drift
    Reconcile(reconcile::ReconcileArgs),
    /// Show the active roster of a class
    Roster(class::ClassArgs),
    /// Show the waitlist of a class in serving order
    Waitlist(class::ClassArgs),
    /// Show seat usage of a class
    Capacity(class::ClassArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Reconcile(args) => reconcile::execute(args, &self.config, self.format).await,
            Commands::Roster(args) => class::roster(args, &self.config, self.format).await,
            Commands::Waitlist(args) => class::waitlist(args, &self.config, self.format).await,
            Commands::Capacity(args) => class::capacity(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path)
}

/// Helper: connect the configured admission store
pub async fn connect_store(config_path: &str) -> Result<StoreDispatch, AppError> {
    let config = load_config(config_path)?;
    StoreDispatch::connect(&config.database).await
}

/// Helper: parse an identifier argument
pub fn parse_id<T: FromStr>(raw: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("Invalid UUID: {raw}")))
}
