//! Output formatting utilities

use registrar_core::{Course, FilterResult, ImportReport, Instructor, Person, Student};

pub fn format_student(student: &Student) -> String {
    format!(
        "{}  {}  {}  {}  courses: {}",
        student.student_id,
        student.name(),
        student.age(),
        student.email(),
        join_or_none(student.course_names())
    )
}

pub fn format_instructor(instructor: &Instructor) -> String {
    format!(
        "{}  {}  {}  {}  courses: {}",
        instructor.instructor_id,
        instructor.name(),
        instructor.age(),
        instructor.email(),
        join_or_none(
            instructor
                .assigned_courses
                .iter()
                .map(|course| course.course_name.clone())
        )
    )
}

pub fn format_course(course: &Course) -> String {
    format!(
        "{}  {}  instructor: {}  students: {}",
        course.course_id,
        course.course_name,
        course.instructor_id.as_deref().unwrap_or("none"),
        join_or_none(course.enrolled_students.iter().cloned())
    )
}

/// Formats filter/listing results as three titled sections.
pub fn format_records(result: &FilterResult) -> String {
    let mut output = String::new();
    push_section(
        &mut output,
        "Students",
        result.students.iter().map(format_student),
    );
    push_section(
        &mut output,
        "Instructors",
        result.instructors.iter().map(format_instructor),
    );
    push_section(&mut output, "Courses", result.courses.iter().map(format_course));
    output
}

pub fn format_import_report(report: &ImportReport) -> String {
    let mut output = format!(
        "Imported {} students, {} instructors, {} courses, {} registrations ({} skipped)\n",
        report.students_inserted,
        report.instructors_inserted,
        report.courses_inserted,
        report.registrations_inserted,
        report.skipped.len()
    );
    for skipped in &report.skipped {
        output.push_str(&format!(
            "  skipped {} {}: {}\n",
            skipped.kind, skipped.id, skipped.reason
        ));
    }
    output
}

fn push_section(output: &mut String, title: &str, lines: impl Iterator<Item = String>) {
    output.push_str(title);
    output.push_str(":\n");
    let mut empty = true;
    for line in lines {
        empty = false;
        output.push_str("  ");
        output.push_str(&line);
        output.push('\n');
    }
    if empty {
        output.push_str("  (none)\n");
    }
}

fn join_or_none(items: impl IntoIterator<Item = String>) -> String {
    let joined = items.into_iter().collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_core::{RecordKind, SkippedRecord};

    #[test]
    fn test_format_empty_records() {
        let output = format_records(&FilterResult::default());
        assert_eq!(
            output,
            "Students:\n  (none)\nInstructors:\n  (none)\nCourses:\n  (none)\n"
        );
    }

    #[test]
    fn test_format_course_without_instructor() {
        let course = Course::new("C3", "Ethics", None).unwrap();
        assert_eq!(
            format_course(&course),
            "C3  Ethics  instructor: none  students: none"
        );
    }

    #[test]
    fn test_format_student() {
        let student = Student::new("S1", "Alice", 20, "alice@example.com").unwrap();
        assert_eq!(
            format_student(&student),
            "S1  Alice  20  alice@example.com  courses: none"
        );
    }

    #[test]
    fn test_format_import_report_lists_skips() {
        let report = ImportReport {
            students_inserted: 1,
            skipped: vec![SkippedRecord {
                kind: RecordKind::Course,
                id: "C2".to_string(),
                reason: "instructor `I404` does not exist".to_string(),
            }],
            ..ImportReport::default()
        };
        let output = format_import_report(&report);
        assert!(output.starts_with("Imported 1 students, 0 instructors"));
        assert!(output.contains("skipped course C2: instructor `I404` does not exist"));
    }
}
