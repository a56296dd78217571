//! Instructor records.

use super::course::CourseRef;
use super::person::{describe_courses, Person, PersonFields};
use super::validation::{require_non_empty, ValidationResult};

/// Primary identity of an instructor.
pub type InstructorId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instructor {
    pub instructor_id: InstructorId,
    pub person: PersonFields,
    /// Courses that reference this instructor. Filled by the store on read.
    pub assigned_courses: Vec<CourseRef>,
}

impl Instructor {
    pub fn new(
        instructor_id: impl Into<InstructorId>,
        name: impl Into<String>,
        age: i64,
        email: impl Into<String>,
    ) -> ValidationResult<Self> {
        let instructor = Self {
            instructor_id: instructor_id.into(),
            person: PersonFields::new(name, age, email)?,
            assigned_courses: Vec::new(),
        };
        instructor.validate()?;
        Ok(instructor)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_non_empty("instructor_id", &self.instructor_id)?;
        self.person.validate()
    }
}

impl Person for Instructor {
    fn person(&self) -> &PersonFields {
        &self.person
    }

    fn record_id(&self) -> &str {
        &self.instructor_id
    }

    fn introduce(&self) -> String {
        format!(
            "I am an instructor, my name is {}, I am {} years old. These are the courses that I am teaching: {}",
            self.person.name,
            self.person.age,
            describe_courses(
                self.assigned_courses
                    .iter()
                    .map(|course| course.course_name.as_str())
            )
        )
    }
}
