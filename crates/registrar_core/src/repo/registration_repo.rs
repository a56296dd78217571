//! Registration repository contracts and SQLite implementation.
//!
//! # Invariants
//! - A `(StudentID, CourseID)` pair is stored at most once.
//! - Both ends of a registration must exist when it is written.
//! - Listing order is insertion order (`rowid`).

use super::course_repo::parse_course_row;
use super::{row_exists, ConstraintError, RepoResult};
use crate::model::course::CourseRef;
use crate::model::registration::Registration;
use crate::model::student::StudentId;
use rusqlite::{params, Connection};

/// Repository interface for registration links.
pub trait RegistrationRepository {
    fn register(&self, registration: &Registration) -> RepoResult<()>;
    /// Removes a pairing. Returns whether it existed.
    fn drop_registration(&self, student_id: &str, course_id: &str) -> RepoResult<bool>;
    fn list_registrations(&self) -> RepoResult<Vec<Registration>>;
}

/// SQLite-backed registration repository.
pub struct SqliteRegistrationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegistrationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RegistrationRepository for SqliteRegistrationRepository<'_> {
    fn register(&self, registration: &Registration) -> RepoResult<()> {
        registration.validate()?;
        let Registration {
            student_id,
            course_id,
        } = registration;

        if !row_exists(self.conn, "Students", student_id)? {
            return Err(ConstraintError::UnknownStudent(student_id.clone()).into());
        }
        if !row_exists(self.conn, "Courses", course_id)? {
            return Err(ConstraintError::UnknownCourse(course_id.clone()).into());
        }
        if registration_exists(self.conn, student_id, course_id)? {
            return Err(ConstraintError::DuplicateRegistration {
                student_id: student_id.clone(),
                course_id: course_id.clone(),
            }
            .into());
        }

        self.conn.execute(
            "INSERT INTO Registrations (StudentID, CourseID) VALUES (?1, ?2);",
            params![student_id, course_id],
        )?;
        Ok(())
    }

    fn drop_registration(&self, student_id: &str, course_id: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM Registrations WHERE StudentID = ?1 AND CourseID = ?2;",
            params![student_id, course_id],
        )?;
        Ok(changed > 0)
    }

    fn list_registrations(&self) -> RepoResult<Vec<Registration>> {
        let mut stmt = self.conn.prepare(
            "SELECT StudentID, CourseID FROM Registrations ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut registrations = Vec::new();
        while let Some(row) = rows.next()? {
            registrations.push(Registration {
                student_id: row.get(0)?,
                course_id: row.get(1)?,
            });
        }
        Ok(registrations)
    }
}

fn registration_exists(conn: &Connection, student_id: &str, course_id: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM Registrations
            WHERE StudentID = ?1 AND CourseID = ?2
        );",
        params![student_id, course_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Courses a student is registered in, oldest registration first.
pub(crate) fn courses_for_student(conn: &Connection, student_id: &str) -> RepoResult<Vec<CourseRef>> {
    let mut stmt = conn.prepare(
        "SELECT c.ID AS ID, c.Name AS Name, c.InstructorID AS InstructorID
         FROM Registrations r
         INNER JOIN Courses c ON c.ID = r.CourseID
         WHERE r.StudentID = ?1
         ORDER BY r.rowid ASC;",
    )?;
    let mut rows = stmt.query([student_id])?;
    let mut courses = Vec::new();
    while let Some(row) = rows.next()? {
        courses.push(parse_course_row(row)?);
    }
    Ok(courses)
}

/// Students registered in a course, oldest registration first.
pub(crate) fn students_for_course(conn: &Connection, course_id: &str) -> RepoResult<Vec<StudentId>> {
    let mut stmt = conn.prepare(
        "SELECT StudentID FROM Registrations WHERE CourseID = ?1 ORDER BY rowid ASC;",
    )?;
    let mut rows = stmt.query([course_id])?;
    let mut students = Vec::new();
    while let Some(row) = rows.next()? {
        students.push(row.get(0)?);
    }
    Ok(students)
}
