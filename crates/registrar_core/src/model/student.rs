//! Student records.

use super::course::CourseRef;
use super::person::{describe_courses, Person, PersonFields};
use super::validation::{require_non_empty, ValidationResult};

/// Primary identity of a student.
pub type StudentId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub student_id: StudentId,
    pub person: PersonFields,
    /// Courses in registration order. Filled by the store on read.
    pub registered_courses: Vec<CourseRef>,
}

impl Student {
    /// Validated constructor; the record starts with no registrations.
    pub fn new(
        student_id: impl Into<StudentId>,
        name: impl Into<String>,
        age: i64,
        email: impl Into<String>,
    ) -> ValidationResult<Self> {
        let student = Self {
            student_id: student_id.into(),
            person: PersonFields::new(name, age, email)?,
            registered_courses: Vec::new(),
        };
        student.validate()?;
        Ok(student)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_non_empty("student_id", &self.student_id)?;
        self.person.validate()
    }

    /// Names of registered courses, in registration order.
    pub fn course_names(&self) -> Vec<String> {
        self.registered_courses
            .iter()
            .map(|course| course.course_name.clone())
            .collect()
    }
}

impl Person for Student {
    fn person(&self) -> &PersonFields {
        &self.person
    }

    fn record_id(&self) -> &str {
        &self.student_id
    }

    fn introduce(&self) -> String {
        format!(
            "I am a student, my name is {}, I am {} years old. These are the courses that I am taking: {}",
            self.person.name,
            self.person.age,
            describe_courses(
                self.registered_courses
                    .iter()
                    .map(|course| course.course_name.as_str())
            )
        )
    }
}
