//! Birthday use-case service.
//!
//! # Responsibility
//! - Validate birthday input above the repository layer.
//! - Derive upcoming views and "celebrating today" sets from stored records.
//!
//! # Invariants
//! - `add` rejects unreal dates before any storage access.
//! - Every write is a single repository statement, so it either fully
//!   persists or leaves storage untouched.
//! - Service layer remains storage-agnostic.

use crate::dates::{anniversary_keys_on, is_real_date, next_occurrence};
use crate::model::birthday::{
    normalize_name, BirthdayRecord, BirthdayValidationError, UpcomingEntry,
};
use crate::repo::birthday_repo::{BirthdayRepository, RepoError};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of entries returned by `upcoming` when the caller has no preference.
pub const DEFAULT_UPCOMING_LIMIT: usize = 3;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from birthday service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// `(day, month)` is not a real calendar date.
    InvalidDate { day: u32, month: u32 },
    /// Name is blank after normalization.
    InvalidName,
    /// Group id is blank.
    MissingGroup,
    /// A record with the same normalized name already exists in the group.
    DuplicateName { name: String },
    /// No record with this normalized name exists in the group.
    NotFound { name: String },
    /// Storage failed; the operation had no effect.
    Storage(RepoError),
}

impl ServiceError {
    /// Returns whether this error is an expected, user-facing outcome.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate { day, month } => {
                write!(f, "{day:02}/{month:02} is not a real calendar date")
            }
            Self::InvalidName => write!(f, "birthday name must not be blank"),
            Self::MissingGroup => write!(f, "group id must not be blank"),
            Self::DuplicateName { name } => write!(f, "birthday for `{name}` already exists"),
            Self::NotFound { name } => write!(f, "birthday for `{name}` not found"),
            Self::Storage(err) => write!(f, "storage unavailable: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(BirthdayValidationError::InvalidDate { day, month }) => {
                Self::InvalidDate { day, month }
            }
            RepoError::Validation(BirthdayValidationError::EmptyName) => Self::InvalidName,
            RepoError::Validation(BirthdayValidationError::EmptyGroup) => Self::MissingGroup,
            RepoError::DuplicateName { name, .. } => Self::DuplicateName { name },
            RepoError::NotFound { name, .. } => Self::NotFound { name },
            other => Self::Storage(other),
        }
    }
}

/// Birthday service facade.
pub struct BirthdayService<R: BirthdayRepository> {
    repo: R,
}

impl<R: BirthdayRepository> BirthdayService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a birthday in a group and returns the stored record.
    ///
    /// # Errors
    /// - `InvalidDate` before any storage access.
    /// - `DuplicateName` when the name is already known in the group; the
    ///   existing record is left unchanged.
    pub fn add(
        &self,
        name: &str,
        day: u32,
        month: u32,
        group_id: &str,
    ) -> ServiceResult<BirthdayRecord> {
        if !is_real_date(day, month) {
            return Err(ServiceError::InvalidDate { day, month });
        }
        let record = BirthdayRecord::new(name, day, month, group_id);
        self.repo.insert_birthday(&record)?;
        Ok(record)
    }

    /// Forgets the birthday whose full name matches `name`, ignoring case.
    pub fn remove(&self, name: &str, group_id: &str) -> ServiceResult<()> {
        if normalize_name(name).is_empty() {
            return Err(ServiceError::InvalidName);
        }
        self.repo.delete_birthday(name, group_id).map_err(Into::into)
    }

    /// Lists a group's birthdays in calendar order.
    pub fn list(&self, group_id: &str) -> ServiceResult<Vec<BirthdayRecord>> {
        self.repo.list_group(group_id).map_err(Into::into)
    }

    /// Lists records stored exactly on `(day, month)` across all groups.
    pub fn find_on_date(&self, day: u32, month: u32) -> ServiceResult<Vec<BirthdayRecord>> {
        self.repo.find_on_date(day, month).map_err(Into::into)
    }

    /// Lists every record celebrated on `date` across all groups.
    ///
    /// On 28 February of a common year this includes 29 February birthdays.
    pub fn celebrating_on(&self, date: NaiveDate) -> ServiceResult<Vec<BirthdayRecord>> {
        let mut records = Vec::new();
        for (day, month) in anniversary_keys_on(date) {
            records.extend(self.find_on_date(day, month)?);
        }
        Ok(records)
    }

    /// Returns the next `limit` birthdays of a group, soonest first.
    ///
    /// Today's birthdays count as upcoming. Ties on the same date are ordered
    /// by name.
    pub fn upcoming(
        &self,
        group_id: &str,
        today: NaiveDate,
        limit: usize,
    ) -> ServiceResult<Vec<UpcomingEntry>> {
        let mut entries = Vec::new();
        for record in self.list(group_id)? {
            let Some(next) = next_occurrence(record.day, record.month, today) else {
                continue;
            };
            entries.push(UpcomingEntry {
                days_until: (next - today).num_days(),
                next_occurrence: next,
                record,
            });
        }

        entries.sort_by(|a, b| {
            a.next_occurrence
                .cmp(&b.next_occurrence)
                .then_with(|| a.record.name.cmp(&b.record.name))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}
