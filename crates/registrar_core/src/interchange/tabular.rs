//! Flat reporting table covering every collection.
//!
//! Each row is `(ID, Name, Type, SecondaryID, Email)`. People carry their age
//! as secondary id, courses their instructor id, registrations `N/A`.

use super::document::RecordDocument;
use super::files::{DocumentError, DocumentResult};
use crate::model::RecordKind;
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Column header of the flat table.
pub const TABLE_HEADER: [&str; 5] = [
    "ID / Student ID",
    "Name / Course ID",
    "Type",
    "Age/Instructor ID",
    "Email",
];

const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRow {
    /// Record id; student id for registrations.
    pub id: String,
    /// Record name; course id for registrations.
    pub name: String,
    pub kind: RecordKind,
    pub secondary_id: String,
    pub email: String,
}

impl TabularRow {
    fn fields(&self) -> [&str; 5] {
        [
            &self.id,
            &self.name,
            self.kind.label(),
            &self.secondary_id,
            &self.email,
        ]
    }
}

/// Flattens a document: students, instructors, courses, then registrations.
pub fn tabular_rows(document: &RecordDocument) -> Vec<TabularRow> {
    let students = document.students.iter().map(|student| TabularRow {
        id: student.student_id.clone(),
        name: student.name.clone(),
        kind: RecordKind::Student,
        secondary_id: student.age.to_string(),
        email: student.email.clone(),
    });
    let instructors = document.instructors.iter().map(|instructor| TabularRow {
        id: instructor.instructor_id.clone(),
        name: instructor.name.clone(),
        kind: RecordKind::Instructor,
        secondary_id: instructor.age.to_string(),
        email: instructor.email.clone(),
    });
    let courses = document.courses.iter().map(|course| TabularRow {
        id: course.course_id.clone(),
        name: course.course_name.clone(),
        kind: RecordKind::Course,
        secondary_id: course.instructor_id.clone().unwrap_or_default(),
        email: NOT_APPLICABLE.to_string(),
    });
    let registrations = document.registrations.iter().map(|registration| TabularRow {
        id: registration.student_id.clone(),
        name: registration.course_id.clone(),
        kind: RecordKind::Registration,
        secondary_id: NOT_APPLICABLE.to_string(),
        email: NOT_APPLICABLE.to_string(),
    });

    students
        .chain(instructors)
        .chain(courses)
        .chain(registrations)
        .collect()
}

/// Writes header plus rows as CSV with `\r\n` line endings.
pub fn write_csv<W: Write>(rows: &[TabularRow], mut writer: W) -> std::io::Result<()> {
    write_line(&mut writer, TABLE_HEADER)?;
    for row in rows {
        write_line(&mut writer, row.fields())?;
    }
    writer.flush()
}

/// Writes the flat table for `document` to `path`.
pub fn write_table_file(path: &Path, document: &RecordDocument) -> DocumentResult<()> {
    let rows = tabular_rows(document);
    let mut buffer = Vec::new();
    write_csv(&rows, &mut buffer).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, buffer).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_line<W: Write>(writer: &mut W, fields: [&str; 5]) -> std::io::Result<()> {
    let line = fields
        .iter()
        .map(|field| quote_field(field))
        .collect::<Vec<_>>()
        .join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\r\n")
}

fn quote_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
