//! Domain model for group-scoped birthday records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own name normalization shared by storage and lookup.
//!
//! # Invariants
//! - `(name, group_id)` identifies at most one record.
//! - Records carry no year; occurrences are derived at query time.

pub mod birthday;
