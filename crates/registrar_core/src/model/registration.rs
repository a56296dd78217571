//! Student-to-course registration links.

use super::course::CourseId;
use super::student::StudentId;
use super::validation::{require_non_empty, ValidationResult};
use serde::{Deserialize, Serialize};

/// Enrollment of one student in one course. The pair is unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Registration {
    #[serde(rename = "StudentID")]
    pub student_id: StudentId,
    #[serde(rename = "CourseID")]
    pub course_id: CourseId,
}

impl Registration {
    pub fn new(
        student_id: impl Into<StudentId>,
        course_id: impl Into<CourseId>,
    ) -> ValidationResult<Self> {
        let registration = Self {
            student_id: student_id.into(),
            course_id: course_id.into(),
        };
        registration.validate()?;
        Ok(registration)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_non_empty("student_id", &self.student_id)?;
        require_non_empty("course_id", &self.course_id)?;
        Ok(())
    }

    /// Composite identity used in reports, `student_id/course_id`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.student_id, self.course_id)
    }
}
