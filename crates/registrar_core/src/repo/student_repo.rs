//! Student repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Writes validate the full record (or supplied patch fields) first.
//! - Deleting a student removes its registrations via `ON DELETE CASCADE`.
//! - `registered_courses` is recomputed from `Registrations` on every read.

use super::person_rows::{self, PersonTable};
use super::registration_repo::courses_for_student;
use super::{ensure_connection_ready, RepoResult};
use crate::model::person::PersonPatch;
use crate::model::student::{Student, StudentId};
use crate::query::filter::RecordFilter;
use rusqlite::Connection;

/// Repository interface for student operations.
pub trait StudentRepository {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId>;
    fn update_student(&self, student_id: &str, patch: &PersonPatch) -> RepoResult<()>;
    fn rename_student(&self, student_id: &str, new_id: &str) -> RepoResult<()>;
    /// Deletes one student. Returns whether it existed.
    fn delete_student(&self, student_id: &str) -> RepoResult<bool>;
    fn get_student(&self, student_id: &str) -> RepoResult<Option<Student>>;
    fn list_students(&self, filter: &RecordFilter) -> RepoResult<Vec<Student>>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Constructs a repository after checking the connection schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self::new(conn))
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId> {
        student.validate()?;
        person_rows::insert(
            self.conn,
            PersonTable::Students,
            &student.student_id,
            &student.person,
        )?;
        Ok(student.student_id.clone())
    }

    fn update_student(&self, student_id: &str, patch: &PersonPatch) -> RepoResult<()> {
        person_rows::update(self.conn, PersonTable::Students, student_id, patch)
    }

    fn rename_student(&self, student_id: &str, new_id: &str) -> RepoResult<()> {
        person_rows::rename(self.conn, PersonTable::Students, student_id, new_id)
    }

    fn delete_student(&self, student_id: &str) -> RepoResult<bool> {
        person_rows::delete(self.conn, PersonTable::Students, student_id)
    }

    fn get_student(&self, student_id: &str) -> RepoResult<Option<Student>> {
        let students = self.list_students(&RecordFilter::by_id(student_id))?;
        Ok(students.into_iter().next())
    }

    fn list_students(&self, filter: &RecordFilter) -> RepoResult<Vec<Student>> {
        let rows = person_rows::list(self.conn, PersonTable::Students, filter)?;
        let mut students = Vec::with_capacity(rows.len());
        for (student_id, person) in rows {
            let registered_courses = courses_for_student(self.conn, &student_id)?;
            students.push(Student {
                student_id,
                person,
                registered_courses,
            });
        }
        Ok(students)
    }
}
