//! SQLite-backed record store.
//!
//! # Responsibility
//! - Own the database connection and hand it to per-collection repositories.
//! - Apply the configured instructor delete policy.
//!
//! # Invariants
//! - The connection is migrated and schema-checked before the store exists.
//! - Cascades and id renames rely on the schema's foreign keys.

use super::record_store::RecordStore;
use super::{observe, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use crate::model::course::{Course, CourseId, CoursePatch, CourseRef};
use crate::model::instructor::{Instructor, InstructorId};
use crate::model::person::PersonPatch;
use crate::model::registration::Registration;
use crate::model::student::{Student, StudentId};
use crate::query::filter::RecordFilter;
use crate::repo::course_repo::{CourseRepository, SqliteCourseRepository};
use crate::repo::ensure_connection_ready;
use crate::repo::instructor_repo::{
    InstructorDeletePolicy, InstructorRepository, SqliteInstructorRepository,
};
use crate::repo::registration_repo::{RegistrationRepository, SqliteRegistrationRepository};
use crate::repo::student_repo::{SqliteStudentRepository, StudentRepository};
use rusqlite::Connection;
use std::path::Path;

const BACKEND: &str = "sqlite";

/// Record store persisted in SQLite tables.
pub struct SqliteRecordStore {
    conn: Connection,
    policy: InstructorDeletePolicy,
}

impl SqliteRecordStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>, policy: InstructorDeletePolicy) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?, policy)
    }

    pub fn open_in_memory(policy: InstructorDeletePolicy) -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?, policy)
    }

    /// Wraps an existing connection after checking its schema.
    pub fn from_connection(conn: Connection, policy: InstructorDeletePolicy) -> StoreResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self { conn, policy })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn students(&self) -> SqliteStudentRepository<'_> {
        SqliteStudentRepository::new(&self.conn)
    }

    fn instructors(&self) -> SqliteInstructorRepository<'_> {
        SqliteInstructorRepository::new(&self.conn)
    }

    fn courses(&self) -> SqliteCourseRepository<'_> {
        SqliteCourseRepository::new(&self.conn)
    }

    fn registrations(&self) -> SqliteRegistrationRepository<'_> {
        SqliteRegistrationRepository::new(&self.conn)
    }
}

impl RecordStore for SqliteRecordStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn delete_policy(&self) -> InstructorDeletePolicy {
        self.policy
    }

    fn insert_student(&mut self, student: &Student) -> StoreResult<StudentId> {
        observe(BACKEND, "student_create", || {
            Ok(self.students().create_student(student)?)
        })
    }

    fn insert_instructor(&mut self, instructor: &Instructor) -> StoreResult<InstructorId> {
        observe(BACKEND, "instructor_create", || {
            Ok(self.instructors().create_instructor(instructor)?)
        })
    }

    fn insert_course(&mut self, course: &CourseRef) -> StoreResult<CourseId> {
        observe(BACKEND, "course_create", || {
            self.courses().create_course(course)?;
            Ok(course.course_id.clone())
        })
    }

    fn edit_student(&mut self, student_id: &str, patch: &PersonPatch) -> StoreResult<()> {
        observe(BACKEND, "student_edit", || {
            Ok(self.students().update_student(student_id, patch)?)
        })
    }

    fn edit_instructor(&mut self, instructor_id: &str, patch: &PersonPatch) -> StoreResult<()> {
        observe(BACKEND, "instructor_edit", || {
            Ok(self.instructors().update_instructor(instructor_id, patch)?)
        })
    }

    fn edit_course(&mut self, course_id: &str, patch: &CoursePatch) -> StoreResult<()> {
        observe(BACKEND, "course_edit", || {
            Ok(self.courses().update_course(course_id, patch)?)
        })
    }

    fn rename_student(&mut self, student_id: &str, new_id: &str) -> StoreResult<()> {
        observe(BACKEND, "student_rename", || {
            Ok(self.students().rename_student(student_id, new_id)?)
        })
    }

    fn rename_instructor(&mut self, instructor_id: &str, new_id: &str) -> StoreResult<()> {
        observe(BACKEND, "instructor_rename", || {
            Ok(self.instructors().rename_instructor(instructor_id, new_id)?)
        })
    }

    fn rename_course(&mut self, course_id: &str, new_id: &str) -> StoreResult<()> {
        observe(BACKEND, "course_rename", || {
            Ok(self.courses().rename_course(course_id, new_id)?)
        })
    }

    fn delete_student(&mut self, student_id: &str) -> StoreResult<bool> {
        observe(BACKEND, "student_delete", || {
            Ok(self.students().delete_student(student_id)?)
        })
    }

    fn delete_instructor(&mut self, instructor_id: &str) -> StoreResult<bool> {
        let policy = self.policy;
        observe(BACKEND, "instructor_delete", || {
            Ok(self.instructors().delete_instructor(instructor_id, policy)?)
        })
    }

    fn delete_course(&mut self, course_id: &str) -> StoreResult<bool> {
        observe(BACKEND, "course_delete", || {
            Ok(self.courses().delete_course(course_id)?)
        })
    }

    fn register_student(&mut self, student_id: &str, course_id: &str) -> StoreResult<()> {
        let registration = Registration {
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
        };
        observe(BACKEND, "registration_create", || {
            Ok(self.registrations().register(&registration)?)
        })
    }

    fn drop_student(&mut self, student_id: &str, course_id: &str) -> StoreResult<bool> {
        observe(BACKEND, "registration_drop", || {
            Ok(self
                .registrations()
                .drop_registration(student_id, course_id)?)
        })
    }

    fn assign_instructor(&mut self, course_id: &str, instructor_id: &str) -> StoreResult<()> {
        observe(BACKEND, "course_assign_instructor", || {
            Ok(self.courses().assign_instructor(course_id, instructor_id)?)
        })
    }

    fn get_student(&self, student_id: &str) -> StoreResult<Option<Student>> {
        Ok(self.students().get_student(student_id)?)
    }

    fn get_instructor(&self, instructor_id: &str) -> StoreResult<Option<Instructor>> {
        Ok(self.instructors().get_instructor(instructor_id)?)
    }

    fn get_course(&self, course_id: &str) -> StoreResult<Option<Course>> {
        Ok(self.courses().get_course(course_id)?)
    }

    fn list_students(&self, filter: &RecordFilter) -> StoreResult<Vec<Student>> {
        Ok(self.students().list_students(filter)?)
    }

    fn list_instructors(&self, filter: &RecordFilter) -> StoreResult<Vec<Instructor>> {
        Ok(self.instructors().list_instructors(filter)?)
    }

    fn list_courses(&self, filter: &RecordFilter) -> StoreResult<Vec<Course>> {
        Ok(self.courses().list_courses(filter)?)
    }

    fn list_registrations(&self) -> StoreResult<Vec<Registration>> {
        Ok(self.registrations().list_registrations()?)
    }
}
