//! Academic records domain model.
//!
//! # Responsibility
//! - Define validated record shapes for students, instructors, courses and
//!   registrations.
//! - Keep field validation in one place so every write path shares it.
//!
//! # Invariants
//! - Records are built through validating constructors.
//! - Derived lists (`registered_courses`, `assigned_courses`,
//!   `enrolled_students`) are views filled by the store, never sources of truth.

pub mod course;
pub mod instructor;
pub mod person;
pub mod registration;
pub mod student;
pub mod validation;

use std::fmt::{Display, Formatter};

/// Record collections managed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Student,
    Instructor,
    Course,
    Registration,
}

impl RecordKind {
    /// Stable lowercase identifier used in logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::Course => "course",
            Self::Registration => "registration",
        }
    }

    /// Capitalized label used in flat table exports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Instructor => "Instructor",
            Self::Course => "Course",
            Self::Registration => "Registration",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
