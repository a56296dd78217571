//! Course records and their partial-update shape.

use super::instructor::InstructorId;
use super::student::StudentId;
use super::validation::{require_non_empty, ValidationResult};
use serde::{Deserialize, Serialize};

/// Primary identity of a course.
pub type CourseId = String;

/// Persisted course shape: identity, name and optional instructor link.
///
/// Also used as the element type of derived course lists on students and
/// instructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
    pub course_id: CourseId,
    pub course_name: String,
    /// Serialized as `null` when the course has no instructor.
    pub instructor_id: Option<InstructorId>,
}

impl CourseRef {
    pub fn new(
        course_id: impl Into<CourseId>,
        course_name: impl Into<String>,
        instructor_id: Option<InstructorId>,
    ) -> ValidationResult<Self> {
        let course = Self {
            course_id: course_id.into(),
            course_name: course_name.into(),
            instructor_id,
        };
        course.validate()?;
        Ok(course)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_non_empty("course_id", &self.course_id)?;
        require_non_empty("course_name", &self.course_name)?;
        if let Some(instructor_id) = &self.instructor_id {
            require_non_empty("instructor_id", instructor_id)?;
        }
        Ok(())
    }
}

/// Course read model with its enrolled students filled in by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub course_id: CourseId,
    pub course_name: String,
    pub instructor_id: Option<InstructorId>,
    /// Registration order, oldest first.
    pub enrolled_students: Vec<StudentId>,
}

impl Course {
    pub fn new(
        course_id: impl Into<CourseId>,
        course_name: impl Into<String>,
        instructor_id: Option<InstructorId>,
    ) -> ValidationResult<Self> {
        let record = CourseRef::new(course_id, course_name, instructor_id)?;
        Ok(Self::from_ref(record, Vec::new()))
    }

    pub fn from_ref(record: CourseRef, enrolled_students: Vec<StudentId>) -> Self {
        Self {
            course_id: record.course_id,
            course_name: record.course_name,
            instructor_id: record.instructor_id,
            enrolled_students,
        }
    }

    pub fn to_ref(&self) -> CourseRef {
        CourseRef {
            course_id: self.course_id.clone(),
            course_name: self.course_name.clone(),
            instructor_id: self.instructor_id.clone(),
        }
    }
}

/// Instructor part of a course patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InstructorPatch {
    /// Leave the current instructor link as it is.
    #[default]
    Keep,
    /// Point the course at another instructor.
    Set(InstructorId),
    /// Remove the instructor link.
    Clear,
}

/// Partial update for a course. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoursePatch {
    pub name: Option<String>,
    pub instructor: InstructorPatch,
}

impl CoursePatch {
    /// Builds a patch from raw form text where an empty entry means "keep".
    pub fn from_form(name: &str, instructor_id: &str) -> Self {
        Self {
            name: super::person::non_empty(name),
            instructor: match super::person::non_empty(instructor_id) {
                Some(id) => InstructorPatch::Set(id),
                None => InstructorPatch::Keep,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.instructor == InstructorPatch::Keep
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            require_non_empty("course_name", name)?;
        }
        if let InstructorPatch::Set(instructor_id) = &self.instructor {
            require_non_empty("instructor_id", instructor_id)?;
        }
        Ok(())
    }
}
