mod common;

use registrar_core::{
    Collection, DocumentDir, DocumentError, DocumentRecordStore, InstructorDeletePolicy,
    RecordDocument, RecordStore, SqliteRecordStore, StoreError,
};
use std::fs;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    store: DocumentRecordStore,
}

fn fixture_with(policy: InstructorDeletePolicy) -> Fixture {
    let dir = TempDir::new().unwrap();
    let store = DocumentRecordStore::open(dir.path(), policy).unwrap();
    Fixture { _dir: dir, store }
}

fn fixture() -> Fixture {
    fixture_with(InstructorDeletePolicy::Cascade)
}

#[test]
fn create_echoes_fields() {
    common::create_echoes_fields(&mut fixture().store);
}

#[test]
fn invalid_fields_are_rejected_without_writing() {
    common::invalid_fields_are_rejected_without_writing(&mut fixture().store);
}

#[test]
fn duplicate_ids_are_rejected() {
    common::duplicate_ids_are_rejected(&mut fixture().store);
}

#[test]
fn course_with_unknown_instructor_is_rejected() {
    common::course_with_unknown_instructor_is_rejected(&mut fixture().store);
}

#[test]
fn partial_edit_keeps_absent_fields() {
    common::partial_edit_keeps_absent_fields(&mut fixture().store);
}

#[test]
fn course_edit_sets_and_clears_instructor() {
    common::course_edit_sets_and_clears_instructor(&mut fixture().store);
}

#[test]
fn deleting_student_or_course_removes_registrations() {
    common::deleting_student_or_course_removes_registrations(&mut fixture().store);
}

#[test]
fn deleting_instructor_cascades_to_courses() {
    common::deleting_instructor_cascades_to_courses(&mut fixture().store);
}

#[test]
fn deleting_instructor_clears_course_links() {
    let mut fixture = fixture_with(InstructorDeletePolicy::ClearReference);
    common::deleting_instructor_clears_course_links(&mut fixture.store);
}

#[test]
fn registration_rules() {
    common::registration_rules(&mut fixture().store);
}

#[test]
fn assign_and_change_instructor() {
    common::assign_and_change_instructor(&mut fixture().store);
}

#[test]
fn renames_cascade_to_links() {
    common::renames_cascade_to_links(&mut fixture().store);
}

#[test]
fn query_matches_name_and_id_exactly() {
    common::query_matches_name_and_id_exactly(&mut fixture().store);
}

#[test]
fn derived_views_follow_links() {
    common::derived_views_follow_links(&mut fixture().store);
}

#[test]
fn export_import_round_trip() {
    common::export_import_round_trip(&mut fixture().store, &mut fixture().store);
}

#[test]
fn import_skips_invalid_and_dangling_records() {
    common::import_skips_invalid_and_dangling_records(&mut fixture().store);
}

#[test]
fn backends_agree_after_round_trip_in_both_directions() {
    let mut sqlite = SqliteRecordStore::open_in_memory(InstructorDeletePolicy::Cascade).unwrap();
    let mut documents = fixture();
    common::export_import_round_trip(&mut sqlite, &mut documents.store);

    let mut back = SqliteRecordStore::open_in_memory(InstructorDeletePolicy::Cascade).unwrap();
    back.import_all(&documents.store.export_all().unwrap())
        .unwrap();
    assert_eq!(
        back.export_all().unwrap(),
        sqlite.export_all().unwrap()
    );
}

#[test]
fn mutations_are_written_through_to_files() {
    let dir = TempDir::new().unwrap();
    let mut store = DocumentRecordStore::open(dir.path(), InstructorDeletePolicy::Cascade).unwrap();
    common::seed(&mut store);
    store.delete_student("S2").unwrap();
    let expected = store.export_all().unwrap();
    drop(store);

    let on_disk = DocumentDir::new(dir.path()).read_document().unwrap();
    assert_eq!(on_disk, expected);

    let reopened = DocumentRecordStore::open(dir.path(), InstructorDeletePolicy::Cascade).unwrap();
    assert_eq!(reopened.export_all().unwrap(), expected);
    assert!(!dir.path().join("students.json.tmp").exists());
}

#[test]
fn failed_mutation_leaves_files_untouched() {
    let dir = TempDir::new().unwrap();
    let mut store = DocumentRecordStore::open(dir.path(), InstructorDeletePolicy::Cascade).unwrap();
    common::seed(&mut store);
    let before = fs::read_to_string(dir.path().join("students.json")).unwrap();

    assert!(store
        .create_student("S1", "Mallory", 30, "mallory@example.com")
        .is_err());
    assert_eq!(
        fs::read_to_string(dir.path().join("students.json")).unwrap(),
        before
    );
}

#[test]
fn open_treats_missing_files_as_empty() {
    let dir = TempDir::new().unwrap();
    DocumentDir::new(dir.path())
        .write_collection::<serde_json::Value>(Collection::Students, &[serde_json::json!({
            "student_id": "S1",
            "name": "Alice",
            "age": 20,
            "email": "alice@example.com",
            "registered_courses": []
        })])
        .unwrap();

    let store = DocumentRecordStore::open(dir.path(), InstructorDeletePolicy::Cascade).unwrap();
    let exported = store.export_all().unwrap();
    assert_eq!(exported.students.len(), 1);
    assert!(exported.courses.is_empty());
}

#[test]
fn open_rejects_corrupt_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("courses.json"), "[{\"course_id\": ").unwrap();

    let err = DocumentRecordStore::open(dir.path(), InstructorDeletePolicy::Cascade)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        StoreError::Document(DocumentError::Parse { .. })
    ));
}

#[test]
fn open_rejects_dangling_course_instructor() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("courses.json"),
        r#"[{"course_id": "C1", "course_name": "Algorithms", "instructor_id": "I404"}]"#,
    )
    .unwrap();

    let err = DocumentRecordStore::open(dir.path(), InstructorDeletePolicy::Cascade)
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::InvalidData(_)));
    assert_eq!(err.error_code(), "invalid_data");
}

#[test]
fn empty_directory_exports_empty_document() {
    let fixture = fixture();
    assert_eq!(fixture.store.export_all().unwrap(), RecordDocument::default());
}
