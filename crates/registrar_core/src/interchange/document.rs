//! JSON document shapes for each record collection.

use crate::model::course::{Course, CourseRef};
use crate::model::instructor::{Instructor, InstructorId};
use crate::model::registration::Registration;
use crate::model::student::{Student, StudentId};
use crate::model::validation::{parse_age, ValidationError, ValidationResult};
use crate::model::RecordKind;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// One of the four independently stored collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Students,
    Instructors,
    Courses,
    Registrations,
}

impl Collection {
    /// Dependency order: referenced collections come first.
    pub const ALL: [Collection; 4] = [
        Self::Students,
        Self::Instructors,
        Self::Courses,
        Self::Registrations,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Students => "students.json",
            Self::Instructors => "instructors.json",
            Self::Courses => "courses.json",
            Self::Registrations => "registrations.json",
        }
    }

    pub fn kind(self) -> RecordKind {
        match self {
            Self::Students => RecordKind::Student,
            Self::Instructors => RecordKind::Instructor,
            Self::Courses => RecordKind::Course,
            Self::Registrations => RecordKind::Registration,
        }
    }
}

/// Exported student entry.
///
/// Reading is lenient per field so that one malformed entry is rejected by
/// [`StudentDocument::to_student`] instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDocument {
    #[serde(default, deserialize_with = "lenient_text")]
    pub student_id: StudentId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default)]
    pub age: AgeField,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: String,
    /// Course names in registration order.
    #[serde(default)]
    pub registered_courses: Vec<String>,
}

impl StudentDocument {
    pub fn from_student(student: &Student) -> Self {
        Self {
            student_id: student.student_id.clone(),
            name: student.person.name.clone(),
            age: AgeField::Number(student.person.age),
            email: student.person.email.clone(),
            registered_courses: student.course_names(),
        }
    }

    /// Rebuilds a validated student; `registered_courses` is not carried over.
    pub fn to_student(&self) -> ValidationResult<Student> {
        Student::new(
            self.student_id.clone(),
            self.name.clone(),
            self.age.to_age()?,
            self.email.clone(),
        )
    }
}

/// Exported instructor entry, read as leniently as [`StudentDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorDocument {
    #[serde(default, deserialize_with = "lenient_text")]
    pub instructor_id: InstructorId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default)]
    pub age: AgeField,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(default)]
    pub assigned_courses: Vec<CourseRef>,
}

impl InstructorDocument {
    pub fn from_instructor(instructor: &Instructor) -> Self {
        Self {
            instructor_id: instructor.instructor_id.clone(),
            name: instructor.person.name.clone(),
            age: AgeField::Number(instructor.person.age),
            email: instructor.person.email.clone(),
            assigned_courses: instructor.assigned_courses.clone(),
        }
    }

    /// Rebuilds a validated instructor; `assigned_courses` is not carried over.
    pub fn to_instructor(&self) -> ValidationResult<Instructor> {
        Instructor::new(
            self.instructor_id.clone(),
            self.name.clone(),
            self.age.to_age()?,
            self.email.clone(),
        )
    }
}

/// Whole record set as four independent collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDocument {
    pub students: Vec<StudentDocument>,
    pub instructors: Vec<InstructorDocument>,
    pub courses: Vec<CourseRef>,
    pub registrations: Vec<Registration>,
}

impl RecordDocument {
    pub fn from_records(
        students: &[Student],
        instructors: &[Instructor],
        courses: &[Course],
        registrations: Vec<Registration>,
    ) -> Self {
        Self {
            students: students.iter().map(StudentDocument::from_student).collect(),
            instructors: instructors
                .iter()
                .map(InstructorDocument::from_instructor)
                .collect(),
            courses: courses.iter().map(Course::to_ref).collect(),
            registrations,
        }
    }

    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Students => self.students.len(),
            Collection::Instructors => self.instructors.len(),
            Collection::Courses => self.courses.len(),
            Collection::Registrations => self.registrations.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Collection::ALL
            .iter()
            .all(|collection| self.len(*collection) == 0)
    }
}

/// Age as stored in a document: `20`, `"20"` (older exports kept form text
/// verbatim) or anything else, which fails validation on conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgeField {
    Number(i64),
    Text(String),
    Other(Value),
}

impl AgeField {
    /// Validated positive age.
    pub fn to_age(&self) -> ValidationResult<i64> {
        match self {
            Self::Number(age) => parse_age(&age.to_string()),
            Self::Text(text) => parse_age(text),
            Self::Other(value) => Err(ValidationError::InvalidAge(value.to_string())),
        }
    }
}

impl Default for AgeField {
    fn default() -> Self {
        Self::Other(Value::Null)
    }
}

impl Display for AgeField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(age) => write!(f, "{age}"),
            Self::Text(text) => write!(f, "{text}"),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Text field that tolerates `null` and non-string scalars.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}
