//! # Database Errors
//!
//! `DbError` sorts sqlx failures into the handful of cases callers act on.
//! Reads surface it directly; the checkout path converts it into a
//! [`StoreError`] so the committer can tell a bill-number collision from an
//! outage.
//!
//! ```text
//!   sqlx::Error ──► DbError ──┬──► StoreError   (SqliteRecordStore)
//!                             └──► ApiError     (till commands)
//! ```

use sqlx::error::ErrorKind;
use tally_checkout::{StoreError, Table};
use thiserror::Error;

/// Which table constraint a statement broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Unique,
    ForeignKey,
    Check,
    NotNull,
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// `detail` is SQLite's text; for `Unique` it ends in `<table>.<column>`.
    #[error("{kind:?} constraint failed: {detail}")]
    ConstraintViolation { kind: Constraint, detail: String },

    /// The database could not be reached, was locked past the busy
    /// timeout, or the pool had no free connection.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored row that no longer satisfies the domain types.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// The `<table>.<column>` a unique violation names, if this is one.
    pub fn unique_field(&self) -> Option<&str> {
        match self {
            DbError::ConstraintViolation {
                kind: Constraint::Unique,
                detail,
            } => detail.rsplit(": ").next(),
            _ => None,
        }
    }
}

fn constraint_kind(kind: ErrorKind, message: &str) -> Option<Constraint> {
    match kind {
        ErrorKind::UniqueViolation => Some(Constraint::Unique),
        ErrorKind::ForeignKeyViolation => Some(Constraint::ForeignKey),
        ErrorKind::CheckViolation => Some(Constraint::Check),
        ErrorKind::NotNullViolation => Some(Constraint::NotNull),
        // Older SQLite builds report the plain SQLITE_CONSTRAINT code
        _ if message.contains("UNIQUE constraint failed") => Some(Constraint::Unique),
        _ if message.contains("FOREIGN KEY constraint failed") => Some(Constraint::ForeignKey),
        _ if message.contains("CHECK constraint failed") => Some(Constraint::Check),
        _ => None,
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match constraint_kind(db_err.kind(), &message) {
                    Some(kind) => DbError::ConstraintViolation { kind, detail: message },
                    None if message.contains("database is locked") => DbError::Unavailable(message),
                    None => DbError::QueryFailed(message),
                }
            }
            sqlx::Error::PoolTimedOut => DbError::Unavailable("no free connection in the pool".to_string()),
            sqlx::Error::PoolClosed => DbError::Unavailable("pool is closed".to_string()),
            sqlx::Error::Io(e) => DbError::Unavailable(e.to_string()),
            other => DbError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// `bills.bill_number` becomes a duplicate the committer retries on;
/// outages stay retriable; anything else is internal.
impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        if let Some(field) = err.unique_field() {
            return match field.split_once('.') {
                Some((table, column)) => match Table::from_name(table) {
                    Some(table) => StoreError::Duplicate {
                        table,
                        field: column.to_string(),
                    },
                    None => StoreError::Internal(err.to_string()),
                },
                None => StoreError::Internal(err.to_string()),
            };
        }

        match err {
            DbError::ConstraintViolation {
                kind: Constraint::ForeignKey,
                detail,
            } => StoreError::Rejected {
                table: Table::BillItems,
                reason: detail,
            },
            DbError::Unavailable(msg) => StoreError::Unavailable(msg),
            other => StoreError::Internal(other.to_string()),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
