//! Roster, waitlist, and capacity inspection commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use enrollhub_core::error::AppError;
use enrollhub_core::types::id::ClassId;
use enrollhub_database::{AdmissionStore, StoreDispatch};
use enrollhub_entity::class::{CapacitySnapshot, Class};

/// Arguments naming one class
#[derive(Debug, Args)]
pub struct ClassArgs {
    /// Class ID
    pub class_id: String,
}

/// Roster row for table output
#[derive(Debug, Serialize, Tabled)]
struct RosterRow {
    /// Student ID
    student_id: String,
    /// Enrolled at
    enrolled_at: String,
    /// Notes
    notes: String,
}

/// Waitlist row for table output
#[derive(Debug, Serialize, Tabled)]
struct WaitlistRow {
    /// Rank in serving order
    rank: usize,
    /// Student ID
    student_id: String,
    /// Arrival position
    position: i32,
    /// Priority tier
    priority: bool,
    /// Added at
    added_at: String,
}

/// Capacity row for table output
#[derive(Debug, Serialize, Tabled)]
struct CapacityRow {
    /// Class name
    name: String,
    /// Status
    status: String,
    /// Enrolled
    enrolled: i32,
    /// Max
    max: i32,
    /// Free seats
    available: i32,
    /// Waiting
    waiting: i64,
    /// Minimum met
    meets_minimum: bool,
}

/// `roster <class>`
pub async fn roster(
    args: &ClassArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (store, class) = open(args, config_path).await?;
    let enrollments = store.list_roster(class.id).await?;

    let rows: Vec<RosterRow> = enrollments
        .iter()
        .map(|e| RosterRow {
            student_id: e.student_id.to_string(),
            enrolled_at: e.enrolled_at.format("%Y-%m-%d %H:%M").to_string(),
            notes: e.notes.clone().unwrap_or_default(),
        })
        .collect();

    output::print_list(&rows, format);
    store.close().await;
    Ok(())
}

/// `waitlist <class>`
pub async fn waitlist(
    args: &ClassArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (store, class) = open(args, config_path).await?;
    let entries = store.list_waiting(class.id).await?;

    let rows: Vec<WaitlistRow> = entries
        .iter()
        .enumerate()
        .map(|(idx, e)| WaitlistRow {
            rank: idx + 1,
            student_id: e.student_id.to_string(),
            position: e.position,
            priority: e.is_priority,
            added_at: e.created_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    output::print_list(&rows, format);
    store.close().await;
    Ok(())
}

/// `capacity <class>`
pub async fn capacity(
    args: &ClassArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (store, class) = open(args, config_path).await?;
    let waiting = store.list_waiting(class.id).await?;
    let snapshot = CapacitySnapshot::new(&class, waiting.len() as i64);

    let row = CapacityRow {
        name: class.name.clone(),
        status: snapshot.status.to_string(),
        enrolled: snapshot.current_enrollment,
        max: snapshot.max_capacity,
        available: snapshot.available_seats,
        waiting: snapshot.waiting_count,
        meets_minimum: snapshot.meets_minimum,
    };

    output::print_list(&[row], format);
    store.close().await;
    Ok(())
}

async fn open(args: &ClassArgs, config_path: &str) -> Result<(StoreDispatch, Class), AppError> {
    let class_id: ClassId = super::parse_id(&args.class_id)?;
    let store = super::connect_store(config_path).await?;
    let class = store
        .find_class(class_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Class {class_id} not found")))?;
    Ok((store, class))
}
