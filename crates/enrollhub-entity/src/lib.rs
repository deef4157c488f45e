//! # enrollhub-entity
//!
//! Domain entity models for EnrollHub. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`; status columns are closed enums mapped to PostgreSQL
//! enum types.

pub mod class;
pub mod enrollment;
pub mod waitlist;
