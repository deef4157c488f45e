//! Class entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use enrollhub_core::types::id::{ClassId, OrganizationId};

use super::status::ClassStatus;

/// A scheduled, capacity-bounded class offering.
///
/// `current_enrollment` is a cache of the number of `ACTIVE` enrollments and
/// always satisfies `0 <= current_enrollment <= max_capacity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Class {
    /// Unique class identifier.
    pub id: ClassId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Minimum number of students for the class to run.
    pub min_capacity: i32,
    /// Maximum number of seats.
    pub max_capacity: i32,
    /// Seats currently taken.
    pub current_enrollment: i32,
    /// Lifecycle status.
    pub status: ClassStatus,
    /// Whether students may join the waitlist.
    pub waitlist_enabled: bool,
    /// Whether a withdrawal promotes the next waitlisted student.
    pub auto_enroll_from_waitlist: bool,
    /// When the class was created.
    pub created_at: DateTime<Utc>,
    /// When the class was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Class {
    /// Whether at least one seat is free.
    pub fn has_free_seat(&self) -> bool {
        self.current_enrollment < self.max_capacity
    }

    /// Whether every seat is taken.
    pub fn is_at_capacity(&self) -> bool {
        self.current_enrollment >= self.max_capacity
    }

    /// Number of free seats.
    pub fn available_seats(&self) -> i32 {
        (self.max_capacity - self.current_enrollment).max(0)
    }

    /// Whether enough students are enrolled for the class to run.
    pub fn meets_minimum(&self) -> bool {
        self.current_enrollment >= self.min_capacity
    }
}

/// Data required to create a new class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClass {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Minimum number of students.
    pub min_capacity: i32,
    /// Maximum number of seats.
    pub max_capacity: i32,
    /// Initial lifecycle status.
    pub status: ClassStatus,
    /// Whether students may join the waitlist.
    pub waitlist_enabled: bool,
    /// Whether a withdrawal promotes the next waitlisted student.
    pub auto_enroll_from_waitlist: bool,
}

impl NewClass {
    /// An open class with the given seat count, waitlist and auto-promotion on.
    pub fn open(organization_id: OrganizationId, name: impl Into<String>, max_capacity: i32) -> Self {
        Self {
            organization_id,
            name: name.into(),
            min_capacity: 0,
            max_capacity,
            status: ClassStatus::OpenForEnrollment,
            waitlist_enabled: true,
            auto_enroll_from_waitlist: true,
        }
    }

    /// Check the capacity bounds.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("class name must not be empty".to_string());
        }
        if self.max_capacity < 1 {
            return Err("max_capacity must be at least 1".to_string());
        }
        if self.min_capacity < 0 || self.min_capacity > self.max_capacity {
            return Err("min_capacity must be between 0 and max_capacity".to_string());
        }
        Ok(())
    }

    /// Build the row for a freshly created class.
    pub fn into_class(self, id: ClassId, now: DateTime<Utc>) -> Class {
        Class {
            id,
            organization_id: self.organization_id,
            name: self.name,
            min_capacity: self.min_capacity,
            max_capacity: self.max_capacity,
            current_enrollment: 0,
            status: self.status,
            waitlist_enabled: self.waitlist_enabled,
            auto_enroll_from_waitlist: self.auto_enroll_from_waitlist,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Point-in-time view of a class's seats and queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacitySnapshot {
    /// The class.
    pub class_id: ClassId,
    /// Lifecycle status.
    pub status: ClassStatus,
    /// Minimum number of students.
    pub min_capacity: i32,
    /// Maximum number of seats.
    pub max_capacity: i32,
    /// Seats currently taken.
    pub current_enrollment: i32,
    /// Free seats.
    pub available_seats: i32,
    /// Entries currently waiting.
    pub waiting_count: i64,
    /// Whether the minimum enrollment is reached.
    pub meets_minimum: bool,
}

impl CapacitySnapshot {
    /// Build a snapshot from a class row and its waiting count.
    pub fn new(class: &Class, waiting_count: i64) -> Self {
        Self {
            class_id: class.id,
            status: class.status,
            min_capacity: class.min_capacity,
            max_capacity: class.max_capacity,
            current_enrollment: class.current_enrollment,
            available_seats: class.available_seats(),
            waiting_count,
            meets_minimum: class.meets_minimum(),
        }
    }
}
