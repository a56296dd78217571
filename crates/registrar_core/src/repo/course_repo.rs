//! Course repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `InstructorID`, when set, references an existing instructor at write time.
//! - Deleting a course removes its registrations through `ON DELETE CASCADE`.
//! - Renaming a course id cascades into `Registrations.CourseID`.

use super::registration_repo::students_for_course;
use super::{map_insert_error, row_exists, ConstraintError, RepoError, RepoResult};
use crate::model::course::{Course, CoursePatch, CourseRef, InstructorPatch};
use crate::model::validation::require_non_empty;
use crate::model::RecordKind;
use crate::query::filter::RecordFilter;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

/// Repository interface for course operations.
pub trait CourseRepository {
    fn create_course(&self, course: &CourseRef) -> RepoResult<()>;
    fn update_course(&self, course_id: &str, patch: &CoursePatch) -> RepoResult<()>;
    /// Overwrites the course's instructor link.
    fn assign_instructor(&self, course_id: &str, instructor_id: &str) -> RepoResult<()>;
    fn rename_course(&self, course_id: &str, new_id: &str) -> RepoResult<()>;
    /// Deletes one course. Returns whether it existed.
    fn delete_course(&self, course_id: &str) -> RepoResult<bool>;
    fn get_course(&self, course_id: &str) -> RepoResult<Option<Course>>;
    /// Lists courses matching `filter` (by course name and id) in insertion order.
    fn list_courses(&self, filter: &RecordFilter) -> RepoResult<Vec<Course>>;
}

/// SQLite-backed course repository.
pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn ensure_instructor(&self, instructor_id: &str) -> RepoResult<()> {
        if !row_exists(self.conn, "Instructors", instructor_id)? {
            return Err(ConstraintError::UnknownInstructor(instructor_id.to_string()).into());
        }
        Ok(())
    }

    fn not_found(course_id: &str) -> RepoError {
        RepoError::NotFound {
            kind: RecordKind::Course,
            id: course_id.to_string(),
        }
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn create_course(&self, course: &CourseRef) -> RepoResult<()> {
        course.validate()?;

        if row_exists(self.conn, "Courses", &course.course_id)? {
            return Err(ConstraintError::DuplicateId {
                kind: RecordKind::Course,
                id: course.course_id.clone(),
            }
            .into());
        }
        if let Some(instructor_id) = &course.instructor_id {
            self.ensure_instructor(instructor_id)?;
        }

        self.conn
            .execute(
                "INSERT INTO Courses (ID, Name, InstructorID) VALUES (?1, ?2, ?3);",
                params![
                    course.course_id.as_str(),
                    course.course_name.as_str(),
                    course.instructor_id.as_deref()
                ],
            )
            .map_err(|err| map_insert_error(err, RecordKind::Course, &course.course_id))?;
        Ok(())
    }

    fn update_course(&self, course_id: &str, patch: &CoursePatch) -> RepoResult<()> {
        patch.validate()?;
        if let InstructorPatch::Set(instructor_id) = &patch.instructor {
            self.ensure_instructor(instructor_id)?;
        }

        let mut assignments = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(name) = &patch.name {
            assignments.push("Name = ?");
            bind_values.push(Value::Text(name.clone()));
        }
        match &patch.instructor {
            InstructorPatch::Keep => {}
            InstructorPatch::Set(instructor_id) => {
                assignments.push("InstructorID = ?");
                bind_values.push(Value::Text(instructor_id.clone()));
            }
            InstructorPatch::Clear => assignments.push("InstructorID = NULL"),
        }

        let changed = if assignments.is_empty() {
            usize::from(row_exists(self.conn, "Courses", course_id)?)
        } else {
            bind_values.push(Value::Text(course_id.to_string()));
            self.conn.execute(
                &format!(
                    "UPDATE Courses SET {} WHERE ID = ?;",
                    assignments.join(", ")
                ),
                params_from_iter(bind_values),
            )?
        };

        if changed == 0 {
            return Err(Self::not_found(course_id));
        }
        Ok(())
    }

    fn assign_instructor(&self, course_id: &str, instructor_id: &str) -> RepoResult<()> {
        require_non_empty("instructor_id", instructor_id)?;
        if !row_exists(self.conn, "Courses", course_id)? {
            return Err(Self::not_found(course_id));
        }
        self.ensure_instructor(instructor_id)?;

        self.conn.execute(
            "UPDATE Courses SET InstructorID = ?2 WHERE ID = ?1;",
            params![course_id, instructor_id],
        )?;
        Ok(())
    }

    fn rename_course(&self, course_id: &str, new_id: &str) -> RepoResult<()> {
        require_non_empty("course_id", new_id)?;
        if !row_exists(self.conn, "Courses", course_id)? {
            return Err(Self::not_found(course_id));
        }
        if course_id == new_id {
            return Ok(());
        }
        if row_exists(self.conn, "Courses", new_id)? {
            return Err(ConstraintError::DuplicateId {
                kind: RecordKind::Course,
                id: new_id.to_string(),
            }
            .into());
        }

        self.conn
            .execute(
                "UPDATE Courses SET ID = ?2 WHERE ID = ?1;",
                params![course_id, new_id],
            )
            .map_err(|err| map_insert_error(err, RecordKind::Course, new_id))?;
        Ok(())
    }

    fn delete_course(&self, course_id: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM Courses WHERE ID = ?1;", [course_id])?;
        Ok(changed > 0)
    }

    fn get_course(&self, course_id: &str) -> RepoResult<Option<Course>> {
        let courses = self.list_courses(&RecordFilter::by_id(course_id))?;
        Ok(courses.into_iter().next())
    }

    fn list_courses(&self, filter: &RecordFilter) -> RepoResult<Vec<Course>> {
        let records = select_courses(self.conn, filter)?;
        let mut courses = Vec::with_capacity(records.len());
        for record in records {
            let enrolled = students_for_course(self.conn, &record.course_id)?;
            courses.push(Course::from_ref(record, enrolled));
        }
        Ok(courses)
    }
}

/// Courses referencing an instructor, in insertion order.
pub(crate) fn courses_for_instructor(
    conn: &Connection,
    instructor_id: &str,
) -> RepoResult<Vec<CourseRef>> {
    let mut stmt = conn.prepare(
        "SELECT ID, Name, InstructorID FROM Courses WHERE InstructorID = ?1 ORDER BY rowid ASC;",
    )?;
    let mut rows = stmt.query([instructor_id])?;
    let mut courses = Vec::new();
    while let Some(row) = rows.next()? {
        courses.push(parse_course_row(row)?);
    }
    Ok(courses)
}

fn select_courses(conn: &Connection, filter: &RecordFilter) -> RepoResult<Vec<CourseRef>> {
    let (predicate, bind_values) = filter.sql_predicate();
    let mut stmt = conn.prepare(&format!(
        "SELECT ID, Name, InstructorID FROM Courses{predicate} ORDER BY rowid ASC;"
    ))?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut courses = Vec::new();
    while let Some(row) = rows.next()? {
        courses.push(parse_course_row(row)?);
    }
    Ok(courses)
}

pub(crate) fn parse_course_row(row: &Row<'_>) -> RepoResult<CourseRef> {
    let course = CourseRef {
        course_id: row.get("ID")?,
        course_name: row.get("Name")?,
        instructor_id: row.get("InstructorID")?,
    };
    course.validate().map_err(|err| {
        RepoError::InvalidData(format!("Courses.{}: {err}", course.course_id))
    })?;
    Ok(course)
}
