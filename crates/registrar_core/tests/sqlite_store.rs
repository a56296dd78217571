mod common;

use registrar_core::db::open_db;
use registrar_core::repo::student_repo::{SqliteStudentRepository, StudentRepository};
use registrar_core::{
    InstructorDeletePolicy, RecordFilter, RecordStore, RepoError, SqliteRecordStore, Student,
    StoreError,
};
use rusqlite::Connection;

fn store() -> SqliteRecordStore {
    SqliteRecordStore::open_in_memory(InstructorDeletePolicy::Cascade).unwrap()
}

#[test]
fn create_echoes_fields() {
    common::create_echoes_fields(&mut store());
}

#[test]
fn invalid_fields_are_rejected_without_writing() {
    common::invalid_fields_are_rejected_without_writing(&mut store());
}

#[test]
fn duplicate_ids_are_rejected() {
    common::duplicate_ids_are_rejected(&mut store());
}

#[test]
fn course_with_unknown_instructor_is_rejected() {
    common::course_with_unknown_instructor_is_rejected(&mut store());
}

#[test]
fn partial_edit_keeps_absent_fields() {
    common::partial_edit_keeps_absent_fields(&mut store());
}

#[test]
fn course_edit_sets_and_clears_instructor() {
    common::course_edit_sets_and_clears_instructor(&mut store());
}

#[test]
fn deleting_student_or_course_removes_registrations() {
    common::deleting_student_or_course_removes_registrations(&mut store());
}

#[test]
fn deleting_instructor_cascades_to_courses() {
    common::deleting_instructor_cascades_to_courses(&mut store());
}

#[test]
fn deleting_instructor_clears_course_links() {
    let mut store =
        SqliteRecordStore::open_in_memory(InstructorDeletePolicy::ClearReference).unwrap();
    common::deleting_instructor_clears_course_links(&mut store);
}

#[test]
fn registration_rules() {
    common::registration_rules(&mut store());
}

#[test]
fn assign_and_change_instructor() {
    common::assign_and_change_instructor(&mut store());
}

#[test]
fn renames_cascade_to_links() {
    common::renames_cascade_to_links(&mut store());
}

#[test]
fn query_matches_name_and_id_exactly() {
    common::query_matches_name_and_id_exactly(&mut store());
}

#[test]
fn derived_views_follow_links() {
    common::derived_views_follow_links(&mut store());
}

#[test]
fn export_import_round_trip() {
    common::export_import_round_trip(&mut store(), &mut store());
}

#[test]
fn import_skips_invalid_and_dangling_records() {
    common::import_skips_invalid_and_dangling_records(&mut store());
}

#[test]
fn records_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("university.db");

    let mut first = SqliteRecordStore::open(&path, InstructorDeletePolicy::Cascade).unwrap();
    common::seed(&mut first);
    let exported = first.export_all().unwrap();
    drop(first);

    let reopened = SqliteRecordStore::open(&path, InstructorDeletePolicy::Cascade).unwrap();
    assert_eq!(reopened.export_all().unwrap(), exported);
}

#[test]
fn store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteRecordStore::from_connection(conn, InstructorDeletePolicy::Cascade)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        StoreError::Repo(RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        })
    ));
}

#[test]
fn repository_rejects_connection_missing_a_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("university.db");
    let conn = open_db(&path).unwrap();
    conn.execute_batch("DROP TABLE Registrations;").unwrap();

    let err = SqliteStudentRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::MissingRequiredTable("Registrations")
    ));
}

#[test]
fn invalid_persisted_rows_are_reported_not_masked() {
    let store = store();
    store
        .connection()
        .execute(
            "INSERT INTO Students (ID, Name, Age, Email) VALUES ('S1', 'Alice', 20, 'not-an-email');",
            [],
        )
        .unwrap();

    let err = store.list_students(&RecordFilter::default()).unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn invalid_course_rows_are_reported_through_student_views() {
    let mut store = store();
    store
        .create_student("S1", "Alice", 20, "alice@example.com")
        .unwrap();
    store
        .connection()
        .execute_batch(
            "INSERT INTO Courses (ID, Name, InstructorID) VALUES ('C1', '   ', NULL);
             INSERT INTO Registrations (StudentID, CourseID) VALUES ('S1', 'C1');",
        )
        .unwrap();

    let err = store.get_student("S1").unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
    assert!(err.to_string().contains("Courses.C1"));
}

#[test]
fn repository_filter_binds_values() {
    let store = store();
    let repo = SqliteStudentRepository::new(store.connection());
    repo.create_student(&Student::new("S1", "O'Brien", 20, "ob@example.com").unwrap())
        .unwrap();

    let found = repo
        .list_students(&RecordFilter::by_name("O'Brien"))
        .unwrap();
    assert_eq!(found.len(), 1);
    let none = repo
        .list_students(&RecordFilter::new("x' OR 1=1 --", ""))
        .unwrap();
    assert!(none.is_empty());
}
