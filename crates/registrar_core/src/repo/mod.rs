//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define per-collection data access contracts.
//! - Isolate SQL details from store orchestration.
//! - Translate referential/uniqueness failures into [`ConstraintError`].
//!
//! # Invariants
//! - Write paths validate records before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Every SQL statement binds user-supplied values as parameters.

pub mod course_repo;
pub mod instructor_repo;
mod person_rows;
pub mod registration_repo;
pub mod student_repo;

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::validation::ValidationError;
use crate::model::RecordKind;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Uniqueness and referential-integrity violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    /// A record with this primary id already exists.
    DuplicateId { kind: RecordKind, id: String },
    /// The student is already registered in the course.
    DuplicateRegistration {
        student_id: String,
        course_id: String,
    },
    UnknownStudent(String),
    UnknownCourse(String),
    UnknownInstructor(String),
}

impl Display for ConstraintError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId { kind, id } => write!(f, "{kind} `{id}` already exists"),
            Self::DuplicateRegistration {
                student_id,
                course_id,
            } => write!(
                f,
                "student `{student_id}` is already registered in course `{course_id}`"
            ),
            Self::UnknownStudent(id) => write!(f, "student `{id}` does not exist"),
            Self::UnknownCourse(id) => write!(f, "course `{id}` does not exist"),
            Self::UnknownInstructor(id) => write!(f, "instructor `{id}` does not exist"),
        }
    }
}

impl Error for ConstraintError {}

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Constraint(ConstraintError),
    Db(DbError),
    NotFound {
        kind: RecordKind,
        id: String,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Constraint(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "records repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "records repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "records repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted record: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Constraint(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ConstraintError> for RepoError {
    fn from(value: ConstraintError) -> Self {
        Self::Constraint(value)
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

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("Students", &["ID", "Name", "Age", "Email"]),
    ("Instructors", &["ID", "Name", "Age", "Email"]),
    ("Courses", &["ID", "Name", "InstructorID"]),
    ("Registrations", &["StudentID", "CourseID"]),
];

/// Verifies the connection is migrated and carries every record table.
pub fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

/// Returns whether a row with primary id `id` exists in `table`.
///
/// `table` must be one of the static record table names.
pub(crate) fn row_exists(conn: &Connection, table: &'static str, id: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE ID = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Maps a constraint failure on insert to the matching duplicate-id error.
pub(crate) fn map_insert_error(err: rusqlite::Error, kind: RecordKind, id: &str) -> RepoError {
    let db_error = DbError::Sqlite(err);
    if db_error.is_constraint_violation() {
        return RepoError::Constraint(ConstraintError::DuplicateId {
            kind,
            id: id.to_string(),
        });
    }
    RepoError::Db(db_error)
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
