//! Birthday domain model.
//!
//! # Responsibility
//! - Define the persisted birthday record and its derived upcoming view.
//! - Validate record fields before they reach storage.
//!
//! # Invariants
//! - `name` is always stored normalized (see [`normalize_name`]).
//! - `(day, month)` must pass [`crate::dates::is_real_date`].

use crate::dates::is_real_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque identifier of the chat group that owns a record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type GroupId = String;

/// Validation errors for birthday records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthdayValidationError {
    /// Name is blank after normalization.
    EmptyName,
    /// `(day, month)` is not a real calendar date.
    InvalidDate { day: u32, month: u32 },
    /// Group identifier is blank.
    EmptyGroup,
}

impl Display for BirthdayValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "birthday name must not be blank"),
            Self::InvalidDate { day, month } => {
                write!(f, "{day:02}/{month:02} is not a real calendar date")
            }
            Self::EmptyGroup => write!(f, "group id must not be blank"),
        }
    }
}

impl Error for BirthdayValidationError {}

/// Canonical stored birthday for one person in one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthdayRecord {
    /// Lower-cased, single-spaced name used for lookup and uniqueness.
    pub name: String,
    /// Day of month, 1-31.
    pub day: u32,
    /// Month, 1-12.
    pub month: u32,
    /// Owning chat group.
    pub group_id: GroupId,
}

impl BirthdayRecord {
    /// Creates a record with a normalized name.
    ///
    /// This constructor does not validate; call [`BirthdayRecord::validate`].
    pub fn new(name: &str, day: u32, month: u32, group_id: impl Into<GroupId>) -> Self {
        Self {
            name: normalize_name(name),
            day,
            month,
            group_id: group_id.into(),
        }
    }

    /// Checks record invariants.
    ///
    /// # Errors
    /// - `InvalidDate` when `(day, month)` is not a real calendar date.
    /// - `EmptyName` when the name is blank.
    /// - `EmptyGroup` when the group id is blank.
    pub fn validate(&self) -> Result<(), BirthdayValidationError> {
        if !is_real_date(self.day, self.month) {
            return Err(BirthdayValidationError::InvalidDate {
                day: self.day,
                month: self.month,
            });
        }
        if self.name.trim().is_empty() {
            return Err(BirthdayValidationError::EmptyName);
        }
        if self.group_id.trim().is_empty() {
            return Err(BirthdayValidationError::EmptyGroup);
        }
        Ok(())
    }
}

/// Derived view of a record's next occurrence. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingEntry {
    pub record: BirthdayRecord,
    /// Next date the anniversary is observed on, relative to the query date.
    pub next_occurrence: NaiveDate,
    /// Whole days from the query date; `0` means today.
    pub days_until: i64,
}

/// Lower-cases a name and collapses whitespace runs to single spaces.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
