//! Behaviour shared by every `RecordStore` backend.
//!
//! Each backend test binary runs these checks against a fresh store.
#![allow(dead_code)]

use registrar_core::{
    ConstraintError, CoursePatch, InstructorDeletePolicy, InstructorPatch, Person, PersonPatch,
    RecordFilter, RecordKind, RecordStore, StoreError, ValidationError,
};

/// Two instructors, three courses (one unassigned), two students, three registrations.
pub fn seed(store: &mut dyn RecordStore) {
    store
        .create_instructor("I1", "Bob", 45, "bob@uni.edu")
        .unwrap();
    store
        .create_instructor("I2", "Dana", 38, "dana@uni.edu")
        .unwrap();
    store.create_course("C1", "Algorithms", Some("I1")).unwrap();
    store.create_course("C2", "Databases", Some("I2")).unwrap();
    store.create_course("C3", "Ethics", None).unwrap();
    store
        .create_student("S1", "Alice", 20, "alice@example.com")
        .unwrap();
    store
        .create_student("S2", "Carol", 22, "carol@example.com")
        .unwrap();
    store.register_student("S1", "C1").unwrap();
    store.register_student("S1", "C2").unwrap();
    store.register_student("S2", "C1").unwrap();
}

fn registration_keys(store: &dyn RecordStore) -> Vec<String> {
    store
        .list_registrations()
        .unwrap()
        .iter()
        .map(|registration| registration.key())
        .collect()
}

fn course_ids(store: &dyn RecordStore) -> Vec<String> {
    store
        .list_courses(&RecordFilter::default())
        .unwrap()
        .into_iter()
        .map(|course| course.course_id)
        .collect()
}

pub fn create_echoes_fields(store: &mut dyn RecordStore) {
    let id = store
        .create_student("S1", "Alice", 20, "alice@example.com")
        .unwrap();
    assert_eq!(id, "S1");

    let student = store.get_student("S1").unwrap().unwrap();
    assert_eq!(student.name(), "Alice");
    assert_eq!(student.age(), 20);
    assert_eq!(student.email(), "alice@example.com");
    assert!(student.registered_courses.is_empty());
    assert!(store.get_student("S2").unwrap().is_none());
}

pub fn invalid_fields_are_rejected_without_writing(store: &mut dyn RecordStore) {
    let err = store
        .create_student("S1", "   ", 20, "alice@example.com")
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::EmptyField(_))
    ));

    let err = store
        .create_instructor("I1", "Bob", 0, "bob@uni.edu")
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::NonPositiveAge(0))
    ));

    let err = store
        .create_student("S1", "Alice", 20, "alice-at-example")
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::InvalidEmail(_))
    ));

    let err = store.create_course("", "Algorithms", None).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let everything = store.query(&RecordFilter::default()).unwrap();
    assert_eq!(everything.total(), 0);
}

pub fn duplicate_ids_are_rejected(store: &mut dyn RecordStore) {
    seed(store);

    let err = store
        .create_student("S1", "Mallory", 30, "mallory@example.com")
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Constraint(ConstraintError::DuplicateId {
            kind: RecordKind::Student,
            ..
        })
    ));
    assert_eq!(store.get_student("S1").unwrap().unwrap().name(), "Alice");

    let err = store.create_course("C1", "Other", None).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Constraint(ConstraintError::DuplicateId {
            kind: RecordKind::Course,
            ..
        })
    ));
    assert!(store
        .create_instructor("I2", "Eve", 50, "eve@uni.edu")
        .is_err());
}

pub fn course_with_unknown_instructor_is_rejected(store: &mut dyn RecordStore) {
    let err = store
        .create_course("C1", "Algorithms", Some("I404"))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Constraint(ConstraintError::UnknownInstructor(ref id)) if id == "I404"
    ));
    assert!(store.get_course("C1").unwrap().is_none());
}

pub fn partial_edit_keeps_absent_fields(store: &mut dyn RecordStore) {
    seed(store);

    let patch = PersonPatch {
        age: Some(21),
        ..PersonPatch::default()
    };
    store.edit_student("S1", &patch).unwrap();
    let student = store.get_student("S1").unwrap().unwrap();
    assert_eq!(student.age(), 21);
    assert_eq!(student.name(), "Alice");
    assert_eq!(student.email(), "alice@example.com");

    let bad = PersonPatch {
        name: Some("Alicia".to_string()),
        email: Some("broken".to_string()),
        ..PersonPatch::default()
    };
    let err = store.edit_student("S1", &bad).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.get_student("S1").unwrap().unwrap().name(), "Alice");

    let err = store.edit_instructor("I404", &patch).unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            kind: RecordKind::Instructor,
            ..
        }
    ));
    let err = store
        .edit_student("S404", &PersonPatch::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

pub fn course_edit_sets_and_clears_instructor(store: &mut dyn RecordStore) {
    seed(store);

    let rename = CoursePatch {
        name: Some("Advanced Algorithms".to_string()),
        ..CoursePatch::default()
    };
    store.edit_course("C1", &rename).unwrap();
    let course = store.get_course("C1").unwrap().unwrap();
    assert_eq!(course.course_name, "Advanced Algorithms");
    assert_eq!(course.instructor_id.as_deref(), Some("I1"));

    let clear = CoursePatch {
        instructor: InstructorPatch::Clear,
        ..CoursePatch::default()
    };
    store.edit_course("C1", &clear).unwrap();
    assert_eq!(store.get_course("C1").unwrap().unwrap().instructor_id, None);

    let unknown = CoursePatch {
        instructor: InstructorPatch::Set("I404".to_string()),
        ..CoursePatch::default()
    };
    let err = store.edit_course("C1", &unknown).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Constraint(ConstraintError::UnknownInstructor(_))
    ));
    let err = store.edit_course("C404", &rename).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

pub fn deleting_student_or_course_removes_registrations(store: &mut dyn RecordStore) {
    seed(store);

    assert!(store.delete_student("S1").unwrap());
    assert_eq!(registration_keys(store), vec!["S2/C1"]);
    assert!(store.get_student("S1").unwrap().is_none());

    assert!(store.delete_course("C1").unwrap());
    assert!(registration_keys(store).is_empty());
    assert_eq!(course_ids(store), vec!["C2", "C3"]);

    assert!(!store.delete_student("S404").unwrap());
    assert!(!store.delete_course("C404").unwrap());
    assert!(!store.delete_instructor("I404").unwrap());
}

/// Expects a store opened with [`InstructorDeletePolicy::Cascade`].
pub fn deleting_instructor_cascades_to_courses(store: &mut dyn RecordStore) {
    assert_eq!(store.delete_policy(), InstructorDeletePolicy::Cascade);
    seed(store);

    assert!(store.delete_instructor("I1").unwrap());
    assert_eq!(course_ids(store), vec!["C2", "C3"]);
    assert_eq!(registration_keys(store), vec!["S1/C2"]);
    assert_eq!(
        store.get_student("S2").unwrap().unwrap().registered_courses,
        Vec::new()
    );
}

/// Expects a store opened with [`InstructorDeletePolicy::ClearReference`].
pub fn deleting_instructor_clears_course_links(store: &mut dyn RecordStore) {
    assert_eq!(store.delete_policy(), InstructorDeletePolicy::ClearReference);
    seed(store);

    assert!(store.delete_instructor("I1").unwrap());
    assert_eq!(course_ids(store), vec!["C1", "C2", "C3"]);
    assert_eq!(store.get_course("C1").unwrap().unwrap().instructor_id, None);
    assert_eq!(registration_keys(store), vec!["S1/C1", "S1/C2", "S2/C1"]);
}

pub fn registration_rules(store: &mut dyn RecordStore) {
    seed(store);

    let err = store.register_student("S1", "C1").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Constraint(ConstraintError::DuplicateRegistration { .. })
    ));
    let err = store.register_student("S404", "C1").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Constraint(ConstraintError::UnknownStudent(_))
    ));
    let err = store.register_student("S1", "C404").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Constraint(ConstraintError::UnknownCourse(_))
    ));

    assert!(store.drop_student("S1", "C1").unwrap());
    assert!(!store.drop_student("S1", "C1").unwrap());
    assert!(!store.drop_student("S404", "C404").unwrap());
    assert_eq!(registration_keys(store), vec!["S1/C2", "S2/C1"]);
}

pub fn assign_and_change_instructor(store: &mut dyn RecordStore) {
    seed(store);

    store.assign_instructor("C3", "I1").unwrap();
    assert_eq!(
        store.get_course("C3").unwrap().unwrap().instructor_id.as_deref(),
        Some("I1")
    );
    store.change_instructor("C3", "I2").unwrap();
    assert_eq!(
        store.get_course("C3").unwrap().unwrap().instructor_id.as_deref(),
        Some("I2")
    );

    let err = store.assign_instructor("C404", "I1").unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            kind: RecordKind::Course,
            ..
        }
    ));
    let err = store.change_instructor("C3", "I404").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Constraint(ConstraintError::UnknownInstructor(_))
    ));
    assert_eq!(
        store.get_course("C3").unwrap().unwrap().instructor_id.as_deref(),
        Some("I2")
    );
}

pub fn renames_cascade_to_links(store: &mut dyn RecordStore) {
    seed(store);

    store.rename_student("S1", "S9").unwrap();
    store.rename_course("C1", "C7").unwrap();
    store.rename_instructor("I2", "I8").unwrap();

    assert_eq!(registration_keys(store), vec!["S9/C7", "S9/C2", "S2/C7"]);
    assert_eq!(
        store.get_course("C2").unwrap().unwrap().instructor_id.as_deref(),
        Some("I8")
    );
    let instructor = store.get_instructor("I8").unwrap().unwrap();
    assert_eq!(instructor.assigned_courses.len(), 1);
    assert_eq!(course_ids(store), vec!["C7", "C2", "C3"]);

    let err = store.rename_student("S9", "S2").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Constraint(ConstraintError::DuplicateId { .. })
    ));
    let err = store.rename_course("C404", "C5").unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
    let err = store.rename_instructor("I1", " ").unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

pub fn query_matches_name_and_id_exactly(store: &mut dyn RecordStore) {
    seed(store);

    let everything = store.query(&RecordFilter::default()).unwrap();
    assert_eq!(
        (
            everything.students.len(),
            everything.instructors.len(),
            everything.courses.len()
        ),
        (2, 2, 3)
    );

    let by_name = store.query(&RecordFilter::by_name("Alice")).unwrap();
    assert_eq!(by_name.total(), 1);
    assert_eq!(by_name.students[0].student_id, "S1");

    let course = store.query(&RecordFilter::by_name("Databases")).unwrap();
    assert_eq!(course.courses.len(), 1);
    assert_eq!(course.total(), 1);

    let both = store.query(&RecordFilter::new("Alice", "S2")).unwrap();
    assert_eq!(both.total(), 0);
    let both = store.query(&RecordFilter::new("Carol", "S2")).unwrap();
    assert_eq!(both.total(), 1);

    let partial = store.query(&RecordFilter::by_name("Ali")).unwrap();
    assert_eq!(partial.total(), 0);

    let injected = store
        .query(&RecordFilter::by_name("' OR '1'='1"))
        .unwrap();
    assert_eq!(injected.total(), 0);
    assert_eq!(store.query(&RecordFilter::default()).unwrap().total(), 7);
}

pub fn derived_views_follow_links(store: &mut dyn RecordStore) {
    seed(store);

    let student = store.get_student("S1").unwrap().unwrap();
    assert_eq!(student.course_names(), vec!["Algorithms", "Databases"]);
    assert_eq!(
        student.introduce(),
        "I am a student, my name is Alice, I am 20 years old. These are the courses that I am taking: Algorithms, Databases"
    );

    let instructor = store.get_instructor("I1").unwrap().unwrap();
    assert_eq!(instructor.assigned_courses.len(), 1);
    assert_eq!(instructor.assigned_courses[0].course_id, "C1");

    let course = store.get_course("C1").unwrap().unwrap();
    assert_eq!(course.enrolled_students, vec!["S1", "S2"]);
    assert!(store
        .get_course("C3")
        .unwrap()
        .unwrap()
        .enrolled_students
        .is_empty());
}

/// Exports `source` into the empty `target` and checks both record sets match.
pub fn export_import_round_trip(source: &mut dyn RecordStore, target: &mut dyn RecordStore) {
    seed(source);
    let exported = source.export_all().unwrap();

    let report = target.import_all(&exported).unwrap();
    assert_eq!(report.inserted_total(), 10);
    assert!(report.skipped.is_empty());
    assert_eq!(target.export_all().unwrap(), exported);

    let again = target.import_all(&exported).unwrap();
    assert_eq!(again.inserted_total(), 0);
    assert_eq!(again.skipped.len(), 10);
    assert_eq!(target.export_all().unwrap(), exported);
}

pub fn import_skips_invalid_and_dangling_records(store: &mut dyn RecordStore) {
    let document: registrar_core::RecordDocument = serde_json::from_value(serde_json::json!({
        "students": [
            {"student_id": "S1", "name": "Alice", "age": "20", "email": "alice@example.com"},
            {"student_id": "S2", "name": "Bad", "age": -4, "email": "bad@example.com"},
            {"student_id": "S3", "name": "Carol", "age": "twenty", "email": "carol@example.com"},
            {"student_id": "S4", "name": "Dave", "age": 20.0, "email": "dave@example.com"},
            {"student_id": "S5", "name": "Erin", "age": 20, "email": null}
        ],
        "instructors": [],
        "courses": [
            {"course_id": "C1", "course_name": "Algorithms", "instructor_id": null},
            {"course_id": "C2", "course_name": "Databases", "instructor_id": "I404"}
        ],
        "registrations": [
            {"StudentID": "S1", "CourseID": "C1"},
            {"StudentID": "S2", "CourseID": "C1"}
        ]
    }))
    .unwrap();

    let report = store.import_all(&document).unwrap();
    assert_eq!(report.students_inserted, 1);
    assert_eq!(report.courses_inserted, 1);
    assert_eq!(report.registrations_inserted, 1);
    let skipped = report
        .skipped
        .iter()
        .map(|entry| (entry.kind, entry.id.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        skipped,
        vec![
            (RecordKind::Student, "S2"),
            (RecordKind::Student, "S3"),
            (RecordKind::Student, "S4"),
            (RecordKind::Student, "S5"),
            (RecordKind::Course, "C2"),
            (RecordKind::Registration, "S2/C1"),
        ]
    );
    assert_eq!(registration_keys(store), vec!["S1/C1"]);
    assert!(report.skipped[1].reason.contains("twenty"));
}
