//! Core domain logic for the registrar records store.
//! This crate is the single source of truth for record invariants.

pub mod config;
pub mod db;
pub mod interchange;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{Backend, ConfigError, LoggingConfig, RegistrarConfig};
pub use interchange::document::{Collection, RecordDocument};
pub use interchange::files::{DocumentDir, DocumentError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::course::{Course, CourseId, CoursePatch, CourseRef, InstructorPatch};
pub use model::instructor::{Instructor, InstructorId};
pub use model::person::{Person, PersonFields, PersonPatch};
pub use model::registration::Registration;
pub use model::student::{Student, StudentId};
pub use model::validation::ValidationError;
pub use model::RecordKind;
pub use query::filter::{FilterResult, RecordFilter};
pub use repo::instructor_repo::InstructorDeletePolicy;
pub use repo::{ConstraintError, RepoError};
pub use service::{
    open_store, DocumentRecordStore, ImportReport, RecordStore, SkippedRecord,
    SqliteRecordStore, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
