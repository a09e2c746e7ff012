//! Domain layer for the Rollcall backend.
//!
//! This crate contains:
//! - Domain models and wire DTOs (runs, calendar days, attendance)
//! - The registration outcome variants
//! - Tally events and the in-process event bus

pub mod events;
pub mod models;
