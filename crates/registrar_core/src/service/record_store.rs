//! Backend-neutral record store contract.
//!
//! # Responsibility
//! - Expose create/edit/rename/delete/link operations over all collections.
//! - Provide export and import of the whole record set on top of them.
//!
//! # Invariants
//! - Import appends in dependency order and rejects records one at a time.
//! - `import_all(export_all())` into an empty store reproduces the record set.

use super::{StoreError, StoreResult};
use crate::interchange::document::RecordDocument;
use crate::model::course::{Course, CourseId, CoursePatch, CourseRef};
use crate::model::instructor::{Instructor, InstructorId};
use crate::model::person::PersonPatch;
use crate::model::registration::Registration;
use crate::model::student::{Student, StudentId};
use crate::model::RecordKind;
use crate::query::filter::{FilterResult, RecordFilter};
use crate::repo::instructor_repo::InstructorDeletePolicy;
use log::info;
use std::time::Instant;

/// Single authority over students, instructors, courses and registrations.
///
/// Read operations fill derived views (`registered_courses`,
/// `assigned_courses`, `enrolled_students`) from link rows on every call.
pub trait RecordStore {
    /// Short backend label used in logs.
    fn backend_name(&self) -> &'static str;
    fn delete_policy(&self) -> InstructorDeletePolicy;

    fn insert_student(&mut self, student: &Student) -> StoreResult<StudentId>;
    fn insert_instructor(&mut self, instructor: &Instructor) -> StoreResult<InstructorId>;
    fn insert_course(&mut self, course: &CourseRef) -> StoreResult<CourseId>;

    fn edit_student(&mut self, student_id: &str, patch: &PersonPatch) -> StoreResult<()>;
    fn edit_instructor(&mut self, instructor_id: &str, patch: &PersonPatch) -> StoreResult<()>;
    fn edit_course(&mut self, course_id: &str, patch: &CoursePatch) -> StoreResult<()>;

    /// Changes a student id; registrations follow the new id.
    fn rename_student(&mut self, student_id: &str, new_id: &str) -> StoreResult<()>;
    /// Changes an instructor id; course links follow the new id.
    fn rename_instructor(&mut self, instructor_id: &str, new_id: &str) -> StoreResult<()>;
    /// Changes a course id; registrations follow the new id.
    fn rename_course(&mut self, course_id: &str, new_id: &str) -> StoreResult<()>;

    /// Removes a student and its registrations. Returns whether it existed.
    fn delete_student(&mut self, student_id: &str) -> StoreResult<bool>;
    /// Removes an instructor according to [`RecordStore::delete_policy`].
    fn delete_instructor(&mut self, instructor_id: &str) -> StoreResult<bool>;
    fn delete_course(&mut self, course_id: &str) -> StoreResult<bool>;

    fn register_student(&mut self, student_id: &str, course_id: &str) -> StoreResult<()>;
    /// Removes one registration. Absent pairs are a no-op returning `false`.
    fn drop_student(&mut self, student_id: &str, course_id: &str) -> StoreResult<bool>;
    fn assign_instructor(&mut self, course_id: &str, instructor_id: &str) -> StoreResult<()>;

    fn get_student(&self, student_id: &str) -> StoreResult<Option<Student>>;
    fn get_instructor(&self, instructor_id: &str) -> StoreResult<Option<Instructor>>;
    fn get_course(&self, course_id: &str) -> StoreResult<Option<Course>>;

    fn list_students(&self, filter: &RecordFilter) -> StoreResult<Vec<Student>>;
    fn list_instructors(&self, filter: &RecordFilter) -> StoreResult<Vec<Instructor>>;
    /// Courses match the filter on course name and course id.
    fn list_courses(&self, filter: &RecordFilter) -> StoreResult<Vec<Course>>;
    fn list_registrations(&self) -> StoreResult<Vec<Registration>>;

    fn create_student(
        &mut self,
        student_id: &str,
        name: &str,
        age: i64,
        email: &str,
    ) -> StoreResult<StudentId> {
        let student = Student::new(student_id, name, age, email)?;
        self.insert_student(&student)
    }

    fn create_instructor(
        &mut self,
        instructor_id: &str,
        name: &str,
        age: i64,
        email: &str,
    ) -> StoreResult<InstructorId> {
        let instructor = Instructor::new(instructor_id, name, age, email)?;
        self.insert_instructor(&instructor)
    }

    fn create_course(
        &mut self,
        course_id: &str,
        course_name: &str,
        instructor_id: Option<&str>,
    ) -> StoreResult<CourseId> {
        let course = CourseRef::new(course_id, course_name, instructor_id.map(str::to_string))?;
        self.insert_course(&course)
    }

    /// Same overwrite as [`RecordStore::assign_instructor`].
    fn change_instructor(&mut self, course_id: &str, instructor_id: &str) -> StoreResult<()> {
        self.assign_instructor(course_id, instructor_id)
    }

    /// Exact-equality search across students, instructors and courses.
    fn query(&self, filter: &RecordFilter) -> StoreResult<FilterResult> {
        Ok(FilterResult {
            students: self.list_students(filter)?,
            instructors: self.list_instructors(filter)?,
            courses: self.list_courses(filter)?,
        })
    }

    fn export_all(&self) -> StoreResult<RecordDocument> {
        let everything = self.query(&RecordFilter::default())?;
        let registrations = self.list_registrations()?;
        Ok(RecordDocument::from_records(
            &everything.students,
            &everything.instructors,
            &everything.courses,
            registrations,
        ))
    }

    /// Appends every record of `document` that the store accepts.
    ///
    /// Derived lists in the document are ignored. Records rejected by
    /// validation or constraints are reported in [`ImportReport::skipped`];
    /// storage failures abort the import.
    fn import_all(&mut self, document: &RecordDocument) -> StoreResult<ImportReport> {
        let started_at = Instant::now();
        let mut report = ImportReport::default();

        for entry in &document.students {
            let outcome = entry
                .to_student()
                .map_err(StoreError::from)
                .and_then(|student| self.insert_student(&student));
            report.record(RecordKind::Student, &entry.student_id, outcome)?;
        }
        for entry in &document.instructors {
            let outcome = entry
                .to_instructor()
                .map_err(StoreError::from)
                .and_then(|instructor| self.insert_instructor(&instructor));
            report.record(RecordKind::Instructor, &entry.instructor_id, outcome)?;
        }
        for course in &document.courses {
            let outcome = self.insert_course(course);
            report.record(RecordKind::Course, &course.course_id, outcome)?;
        }
        for registration in &document.registrations {
            let outcome =
                self.register_student(&registration.student_id, &registration.course_id);
            report.record(RecordKind::Registration, &registration.key(), outcome)?;
        }

        info!(
            "event=records_import module=service backend={} status=ok duration_ms={} inserted={} skipped={}",
            self.backend_name(),
            started_at.elapsed().as_millis(),
            report.inserted_total(),
            report.skipped.len()
        );
        Ok(report)
    }
}

/// Record rejected during import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub kind: RecordKind,
    /// Record id; `student/course` for registrations.
    pub id: String,
    pub reason: String,
}

/// Outcome of [`RecordStore::import_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub students_inserted: usize,
    pub instructors_inserted: usize,
    pub courses_inserted: usize,
    pub registrations_inserted: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl ImportReport {
    pub fn inserted_total(&self) -> usize {
        self.students_inserted
            + self.instructors_inserted
            + self.courses_inserted
            + self.registrations_inserted
    }

    pub fn inserted(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Student => self.students_inserted,
            RecordKind::Instructor => self.instructors_inserted,
            RecordKind::Course => self.courses_inserted,
            RecordKind::Registration => self.registrations_inserted,
        }
    }

    /// Counts a success, notes a record-level rejection, or propagates the rest.
    fn record<T>(&mut self, kind: RecordKind, id: &str, outcome: StoreResult<T>) -> StoreResult<()> {
        match outcome {
            Ok(_) => {
                let counter = match kind {
                    RecordKind::Student => &mut self.students_inserted,
                    RecordKind::Instructor => &mut self.instructors_inserted,
                    RecordKind::Course => &mut self.courses_inserted,
                    RecordKind::Registration => &mut self.registrations_inserted,
                };
                *counter += 1;
                Ok(())
            }
            Err(err) if err.is_record_level() => {
                self.skipped.push(SkippedRecord {
                    kind,
                    id: id.to_string(),
                    reason: err.to_string(),
                });
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ImportReport;
    use crate::model::validation::ValidationError;
    use crate::model::RecordKind;
    use crate::repo::RepoError;
    use crate::service::{StoreError, StoreResult};

    #[test]
    fn report_counts_successes_and_skips_rejections() {
        let mut report = ImportReport::default();
        report
            .record(RecordKind::Course, "C1", StoreResult::Ok(()))
            .unwrap();
        report
            .record::<()>(
                RecordKind::Student,
                "S1",
                Err(StoreError::Validation(ValidationError::NonPositiveAge(0))),
            )
            .unwrap();

        assert_eq!(report.inserted(RecordKind::Course), 1);
        assert_eq!(report.inserted_total(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].id, "S1");
    }

    #[test]
    fn report_propagates_storage_failures() {
        let mut report = ImportReport::default();
        let err = report
            .record::<()>(
                RecordKind::Student,
                "S1",
                Err(StoreError::from(RepoError::MissingRequiredTable("Students"))),
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "storage_failed");
        assert!(report.skipped.is_empty());
    }
}
