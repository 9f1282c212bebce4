//! Birthday repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide group-scoped insert/delete/list APIs over `birthdays` storage.
//! - Provide the cross-group date query used by the daily scheduler.
//!
//! # Invariants
//! - `(name, group_id)` uniqueness is enforced by a table constraint, so the
//!   check and the write are a single atomic statement.
//! - Lookups compare normalized names exactly; there is no substring match.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::dates::is_real_date;
use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::birthday::{normalize_name, BirthdayRecord, BirthdayValidationError, GroupId};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BIRTHDAY_SELECT_SQL: &str = "SELECT name, day, month, group_id FROM birthdays";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from birthday persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed domain validation before any write.
    Validation(BirthdayValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// A record with the same normalized name already exists in the group.
    DuplicateName { name: String, group_id: GroupId },
    /// No record with this normalized name exists in the group.
    NotFound { name: String, group_id: GroupId },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateName { name, group_id } => {
                write!(f, "birthday for `{name}` already exists in group {group_id}")
            }
            Self::NotFound { name, group_id } => {
                write!(f, "birthday for `{name}` not found in group {group_id}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "birthday repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted birthday data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DuplicateName { .. } => None,
            Self::NotFound { .. } => None,
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<BirthdayValidationError> for RepoError {
    fn from(value: BirthdayValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for birthday records.
pub trait BirthdayRepository {
    /// Inserts one record; never overwrites an existing one.
    fn insert_birthday(&self, record: &BirthdayRecord) -> RepoResult<()>;
    /// Deletes the record whose normalized name matches `name` in `group_id`.
    fn delete_birthday(&self, name: &str, group_id: &str) -> RepoResult<()>;
    /// Lists a group's records ordered by `(month, day, name)`.
    fn list_group(&self, group_id: &str) -> RepoResult<Vec<BirthdayRecord>>;
    /// Lists records on `(day, month)` across all groups, ordered by `(group_id, name)`.
    fn find_on_date(&self, day: u32, month: u32) -> RepoResult<Vec<BirthdayRecord>>;
}

/// SQLite-backed birthday repository.
pub struct SqliteBirthdayRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBirthdayRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BirthdayRepository for SqliteBirthdayRepository<'_> {
    fn insert_birthday(&self, record: &BirthdayRecord) -> RepoResult<()> {
        record.validate()?;
        let name = normalize_name(&record.name);

        let inserted = self.conn.execute(
            "INSERT INTO birthdays (name, day, month, group_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![name, record.day, record.month, record.group_id],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(RepoError::DuplicateName {
                name,
                group_id: record.group_id.clone(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_birthday(&self, name: &str, group_id: &str) -> RepoResult<()> {
        let name = normalize_name(name);
        let changed = self.conn.execute(
            "DELETE FROM birthdays WHERE name = ?1 AND group_id = ?2;",
            params![name, group_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                name,
                group_id: group_id.to_string(),
            });
        }

        Ok(())
    }

    fn list_group(&self, group_id: &str) -> RepoResult<Vec<BirthdayRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BIRTHDAY_SELECT_SQL}
             WHERE group_id = ?1
             ORDER BY month ASC, day ASC, name ASC;"
        ))?;
        let rows = stmt.query_map([group_id], read_raw_row)?;
        collect_records(rows)
    }

    fn find_on_date(&self, day: u32, month: u32) -> RepoResult<Vec<BirthdayRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BIRTHDAY_SELECT_SQL}
             WHERE day = ?1 AND month = ?2
             ORDER BY group_id ASC, name ASC;"
        ))?;
        let rows = stmt.query_map(params![day, month], read_raw_row)?;
        collect_records(rows)
    }
}

struct RawBirthdayRow {
    name: String,
    day: i64,
    month: i64,
    group_id: String,
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawBirthdayRow> {
    Ok(RawBirthdayRow {
        name: row.get("name")?,
        day: row.get("day")?,
        month: row.get("month")?,
        group_id: row.get("group_id")?,
    })
}

fn collect_records(
    rows: impl Iterator<Item = rusqlite::Result<RawBirthdayRow>>,
) -> RepoResult<Vec<BirthdayRecord>> {
    let mut records = Vec::new();
    for row in rows {
        records.push(parse_birthday_row(row?)?);
    }
    Ok(records)
}

fn parse_birthday_row(raw: RawBirthdayRow) -> RepoResult<BirthdayRecord> {
    let day = u32::try_from(raw.day)
        .map_err(|_| RepoError::InvalidData(format!("invalid day `{}`", raw.day)))?;
    let month = u32::try_from(raw.month)
        .map_err(|_| RepoError::InvalidData(format!("invalid month `{}`", raw.month)))?;
    if !is_real_date(day, month) {
        return Err(RepoError::InvalidData(format!(
            "stored date {day:02}/{month:02} for `{}` is not a real date",
            raw.name
        )));
    }

    Ok(BirthdayRecord {
        name: raw.name,
        day,
        month,
        group_id: raw.group_id,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
