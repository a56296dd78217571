//! Record store use-case layer.
//!
//! # Responsibility
//! - Define the backend-neutral [`RecordStore`] contract.
//! - Provide the SQLite and JSON document backends.
//! - Lift repository and file errors into one [`StoreError`] boundary type.
//!
//! # Invariants
//! - Both backends enforce the same validation, uniqueness and cascade rules.
//! - A failed operation leaves the record set unchanged.
//! - Store events log metadata only; record contents never reach the log.

pub mod document_store;
pub mod record_store;
pub mod sqlite_store;

pub use document_store::DocumentRecordStore;
pub use record_store::{ImportReport, RecordStore, SkippedRecord};
pub use sqlite_store::SqliteRecordStore;

use crate::config::{Backend, RegistrarConfig};
use crate::db::DbError;
use crate::interchange::files::DocumentError;
use crate::model::validation::ValidationError;
use crate::model::RecordKind;
use crate::repo::{ConstraintError, RepoError};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by every [`RecordStore`] operation.
#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    Constraint(ConstraintError),
    NotFound { kind: RecordKind, id: String },
    /// SQLite backend failure that is not a record-level rejection.
    Repo(RepoError),
    /// Document file failure.
    Document(DocumentError),
    /// Loaded data violates record invariants.
    InvalidData(String),
}

impl StoreError {
    /// Stable machine-readable code for logs and exit statuses.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::Constraint(_) => "constraint_violation",
            Self::NotFound { .. } => "not_found",
            Self::Repo(_) => "storage_failed",
            Self::Document(DocumentError::FileNotFound(_)) => "file_not_found",
            Self::Document(_) => "document_failed",
            Self::InvalidData(_) => "invalid_data",
        }
    }

    /// Whether the error rejects one record rather than the whole operation.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Constraint(_) | Self::NotFound { .. }
        )
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Constraint(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Document(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid record data: {message}"),
        }
    }
}

// Wrapped errors are displayed in place, so the chain continues below them.
impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => err.source(),
            Self::Constraint(err) => err.source(),
            Self::Repo(err) => err.source(),
            Self::Document(err) => err.source(),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::Constraint(err) => Self::Constraint(err),
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::InvalidData(message) => Self::InvalidData(message),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ConstraintError> for StoreError {
    fn from(value: ConstraintError) -> Self {
        Self::Constraint(value)
    }
}

impl From<DocumentError> for StoreError {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

/// Opens the backend selected by `config`.
pub fn open_store(config: &RegistrarConfig) -> StoreResult<Box<dyn RecordStore>> {
    let policy = config.instructor_delete_policy;
    match config.backend {
        Backend::Sqlite => Ok(Box::new(SqliteRecordStore::open(
            &config.database_path,
            policy,
        )?)),
        Backend::Json => Ok(Box::new(DocumentRecordStore::open(
            &config.documents_dir,
            policy,
        )?)),
    }
}

/// Runs one store operation and logs its outcome.
pub(crate) fn observe<T>(
    backend: &'static str,
    event: &'static str,
    op: impl FnOnce() -> StoreResult<T>,
) -> StoreResult<T> {
    let started_at = Instant::now();
    let result = op();
    match &result {
        Ok(_) => debug!(
            "event={event} module=service backend={backend} status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={event} module=service backend={backend} status=error duration_ms={} error_code={}",
            started_at.elapsed().as_millis(),
            err.error_code()
        ),
    }
    result
}
