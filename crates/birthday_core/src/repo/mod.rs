//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for birthday records.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `BirthdayRecord::validate()` before persistence.
//! - Repository APIs return semantic errors (`DuplicateName`, `NotFound`) in
//!   addition to DB transport errors.

pub mod birthday_repo;
