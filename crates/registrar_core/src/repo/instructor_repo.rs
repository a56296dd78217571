//! Instructor repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Instructor deletion follows [`InstructorDeletePolicy`]; both policies
//!   leave no course pointing at a missing instructor.
//! - Renaming an instructor id cascades into `Courses.InstructorID`.

use super::course_repo::courses_for_instructor;
use super::person_rows::{self, PersonTable};
use super::{ensure_connection_ready, RepoResult};
use crate::model::instructor::{Instructor, InstructorId};
use crate::model::person::PersonPatch;
use crate::query::filter::RecordFilter;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// What happens to courses taught by an instructor that is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructorDeletePolicy {
    /// Delete the courses too (and, through them, their registrations).
    #[default]
    Cascade,
    /// Keep the courses with no instructor.
    ClearReference,
}

impl InstructorDeletePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cascade => "cascade",
            Self::ClearReference => "clear_reference",
        }
    }
}

/// Repository interface for instructor operations.
pub trait InstructorRepository {
    fn create_instructor(&self, instructor: &Instructor) -> RepoResult<InstructorId>;
    fn update_instructor(&self, instructor_id: &str, patch: &PersonPatch) -> RepoResult<()>;
    fn rename_instructor(&self, instructor_id: &str, new_id: &str) -> RepoResult<()>;
    /// Deletes one instructor under `policy`. Returns whether it existed.
    fn delete_instructor(
        &self,
        instructor_id: &str,
        policy: InstructorDeletePolicy,
    ) -> RepoResult<bool>;
    fn get_instructor(&self, instructor_id: &str) -> RepoResult<Option<Instructor>>;
    fn list_instructors(&self, filter: &RecordFilter) -> RepoResult<Vec<Instructor>>;
}

/// SQLite-backed instructor repository.
pub struct SqliteInstructorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteInstructorRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Constructs a repository after checking the connection schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self::new(conn))
    }
}

impl InstructorRepository for SqliteInstructorRepository<'_> {
    fn create_instructor(&self, instructor: &Instructor) -> RepoResult<InstructorId> {
        instructor.validate()?;
        person_rows::insert(
            self.conn,
            PersonTable::Instructors,
            &instructor.instructor_id,
            &instructor.person,
        )?;
        Ok(instructor.instructor_id.clone())
    }

    fn update_instructor(&self, instructor_id: &str, patch: &PersonPatch) -> RepoResult<()> {
        person_rows::update(self.conn, PersonTable::Instructors, instructor_id, patch)
    }

    fn rename_instructor(&self, instructor_id: &str, new_id: &str) -> RepoResult<()> {
        person_rows::rename(self.conn, PersonTable::Instructors, instructor_id, new_id)
    }

    fn delete_instructor(
        &self,
        instructor_id: &str,
        policy: InstructorDeletePolicy,
    ) -> RepoResult<bool> {
        match policy {
            InstructorDeletePolicy::Cascade => {
                person_rows::delete(self.conn, PersonTable::Instructors, instructor_id)
            }
            InstructorDeletePolicy::ClearReference => {
                let tx = self.conn.unchecked_transaction()?;
                tx.execute(
                    "UPDATE Courses SET InstructorID = NULL WHERE InstructorID = ?1;",
                    [instructor_id],
                )?;
                let existed = person_rows::delete(&tx, PersonTable::Instructors, instructor_id)?;
                tx.commit()?;
                Ok(existed)
            }
        }
    }

    fn get_instructor(&self, instructor_id: &str) -> RepoResult<Option<Instructor>> {
        let instructors = self.list_instructors(&RecordFilter::by_id(instructor_id))?;
        Ok(instructors.into_iter().next())
    }

    fn list_instructors(&self, filter: &RecordFilter) -> RepoResult<Vec<Instructor>> {
        let rows = person_rows::list(self.conn, PersonTable::Instructors, filter)?;
        let mut instructors = Vec::with_capacity(rows.len());
        for (instructor_id, person) in rows {
            let assigned_courses = courses_for_instructor(self.conn, &instructor_id)?;
            instructors.push(Instructor {
                instructor_id,
                person,
                assigned_courses,
            });
        }
        Ok(instructors)
    }
}
