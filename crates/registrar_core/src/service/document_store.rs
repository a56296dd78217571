//! JSON document backed record store.
//!
//! # Responsibility
//! - Keep the record set in memory, loaded from a [`DocumentDir`] on open.
//! - Rewrite every collection file after each successful mutation.
//!
//! # Invariants
//! - Loaded data must satisfy the same invariants the SQLite schema enforces;
//!   otherwise `open` fails with `StoreError::InvalidData`.
//! - Mutations run against a copy of the state; the copy replaces the live
//!   state only after the files are written.
//! - Missing collection files on open mean empty collections.

use super::record_store::RecordStore;
use super::{observe, StoreError, StoreResult};
use crate::interchange::document::RecordDocument;
use crate::interchange::files::DocumentDir;
use crate::model::course::{Course, CourseId, CoursePatch, CourseRef, InstructorPatch};
use crate::model::instructor::{Instructor, InstructorId};
use crate::model::person::{PersonFields, PersonPatch};
use crate::model::registration::Registration;
use crate::model::student::{Student, StudentId};
use crate::model::validation::require_non_empty;
use crate::model::RecordKind;
use crate::query::filter::RecordFilter;
use crate::repo::instructor_repo::InstructorDeletePolicy;
use crate::repo::ConstraintError;
use log::info;
use std::path::Path;

const BACKEND: &str = "json";

type PersonRow = (String, PersonFields);

/// Record store persisted as one JSON file per collection.
pub struct DocumentRecordStore {
    dir: DocumentDir,
    state: DocumentState,
    policy: InstructorDeletePolicy,
}

impl DocumentRecordStore {
    /// Loads the collections under `dir`.
    ///
    /// Fails on unreadable or corrupt files and on data that breaks record
    /// invariants (duplicate ids, dangling references).
    pub fn open(dir: impl AsRef<Path>, policy: InstructorDeletePolicy) -> StoreResult<Self> {
        let dir = DocumentDir::new(dir.as_ref());
        let document = dir.read_document_or_empty()?;
        let state = DocumentState::from_document(&document)?;
        info!(
            "event=document_store_open module=service backend={BACKEND} status=ok students={} instructors={} courses={} registrations={}",
            state.students.len(),
            state.instructors.len(),
            state.courses.len(),
            state.registrations.len()
        );
        Ok(Self { dir, state, policy })
    }

    pub fn dir(&self) -> &DocumentDir {
        &self.dir
    }

    fn mutate<T>(
        &mut self,
        event: &'static str,
        op: impl FnOnce(&mut DocumentState) -> StoreResult<T>,
    ) -> StoreResult<T> {
        observe(BACKEND, event, || {
            let mut next = self.state.clone();
            let value = op(&mut next)?;
            self.dir.write_document(&next.to_document())?;
            self.state = next;
            Ok(value)
        })
    }
}

impl RecordStore for DocumentRecordStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn delete_policy(&self) -> InstructorDeletePolicy {
        self.policy
    }

    fn insert_student(&mut self, student: &Student) -> StoreResult<StudentId> {
        student.validate()?;
        self.mutate("student_create", |state| {
            insert_person(
                &mut state.students,
                RecordKind::Student,
                &student.student_id,
                &student.person,
            )?;
            Ok(student.student_id.clone())
        })
    }

    fn insert_instructor(&mut self, instructor: &Instructor) -> StoreResult<InstructorId> {
        instructor.validate()?;
        self.mutate("instructor_create", |state| {
            insert_person(
                &mut state.instructors,
                RecordKind::Instructor,
                &instructor.instructor_id,
                &instructor.person,
            )?;
            Ok(instructor.instructor_id.clone())
        })
    }

    fn insert_course(&mut self, course: &CourseRef) -> StoreResult<CourseId> {
        self.mutate("course_create", |state| {
            state.insert_course(course)?;
            Ok(course.course_id.clone())
        })
    }

    fn edit_student(&mut self, student_id: &str, patch: &PersonPatch) -> StoreResult<()> {
        self.mutate("student_edit", |state| {
            edit_person(&mut state.students, RecordKind::Student, student_id, patch)
        })
    }

    fn edit_instructor(&mut self, instructor_id: &str, patch: &PersonPatch) -> StoreResult<()> {
        self.mutate("instructor_edit", |state| {
            edit_person(
                &mut state.instructors,
                RecordKind::Instructor,
                instructor_id,
                patch,
            )
        })
    }

    fn edit_course(&mut self, course_id: &str, patch: &CoursePatch) -> StoreResult<()> {
        self.mutate("course_edit", |state| {
            patch.validate()?;
            if let InstructorPatch::Set(instructor_id) = &patch.instructor {
                state.ensure_instructor(instructor_id)?;
            }
            let course = state.course_mut(course_id)?;
            if let Some(name) = &patch.name {
                course.course_name = name.clone();
            }
            match &patch.instructor {
                InstructorPatch::Keep => {}
                InstructorPatch::Set(instructor_id) => {
                    course.instructor_id = Some(instructor_id.clone());
                }
                InstructorPatch::Clear => course.instructor_id = None,
            }
            Ok(())
        })
    }

    fn rename_student(&mut self, student_id: &str, new_id: &str) -> StoreResult<()> {
        self.mutate("student_rename", |state| {
            rename_person(
                &mut state.students,
                RecordKind::Student,
                "student_id",
                student_id,
                new_id,
            )?;
            for registration in &mut state.registrations {
                if registration.student_id == student_id {
                    registration.student_id = new_id.to_string();
                }
            }
            Ok(())
        })
    }

    fn rename_instructor(&mut self, instructor_id: &str, new_id: &str) -> StoreResult<()> {
        self.mutate("instructor_rename", |state| {
            rename_person(
                &mut state.instructors,
                RecordKind::Instructor,
                "instructor_id",
                instructor_id,
                new_id,
            )?;
            for course in &mut state.courses {
                if course.instructor_id.as_deref() == Some(instructor_id) {
                    course.instructor_id = Some(new_id.to_string());
                }
            }
            Ok(())
        })
    }

    fn rename_course(&mut self, course_id: &str, new_id: &str) -> StoreResult<()> {
        self.mutate("course_rename", |state| {
            require_non_empty("course_id", new_id)?;
            state.course_mut(course_id)?;
            if course_id == new_id {
                return Ok(());
            }
            if state.has_course(new_id) {
                return Err(ConstraintError::DuplicateId {
                    kind: RecordKind::Course,
                    id: new_id.to_string(),
                }
                .into());
            }
            state.course_mut(course_id)?.course_id = new_id.to_string();
            for registration in &mut state.registrations {
                if registration.course_id == course_id {
                    registration.course_id = new_id.to_string();
                }
            }
            Ok(())
        })
    }

    fn delete_student(&mut self, student_id: &str) -> StoreResult<bool> {
        self.mutate("student_delete", |state| {
            let existed = remove_person(&mut state.students, student_id);
            state
                .registrations
                .retain(|registration| registration.student_id != student_id);
            Ok(existed)
        })
    }

    fn delete_instructor(&mut self, instructor_id: &str) -> StoreResult<bool> {
        let policy = self.policy;
        self.mutate("instructor_delete", |state| {
            let existed = remove_person(&mut state.instructors, instructor_id);
            match policy {
                InstructorDeletePolicy::Cascade => {
                    let mut dropped = Vec::new();
                    state.courses.retain(|course| {
                        let taught = course.instructor_id.as_deref() == Some(instructor_id);
                        if taught {
                            dropped.push(course.course_id.clone());
                        }
                        !taught
                    });
                    state
                        .registrations
                        .retain(|registration| !dropped.contains(&registration.course_id));
                }
                InstructorDeletePolicy::ClearReference => {
                    for course in &mut state.courses {
                        if course.instructor_id.as_deref() == Some(instructor_id) {
                            course.instructor_id = None;
                        }
                    }
                }
            }
            Ok(existed)
        })
    }

    fn delete_course(&mut self, course_id: &str) -> StoreResult<bool> {
        self.mutate("course_delete", |state| {
            let before = state.courses.len();
            state.courses.retain(|course| course.course_id != course_id);
            state
                .registrations
                .retain(|registration| registration.course_id != course_id);
            Ok(state.courses.len() != before)
        })
    }

    fn register_student(&mut self, student_id: &str, course_id: &str) -> StoreResult<()> {
        let registration = Registration {
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
        };
        self.mutate("registration_create", |state| {
            state.register(registration)
        })
    }

    fn drop_student(&mut self, student_id: &str, course_id: &str) -> StoreResult<bool> {
        self.mutate("registration_drop", |state| {
            let before = state.registrations.len();
            state.registrations.retain(|registration| {
                !(registration.student_id == student_id && registration.course_id == course_id)
            });
            Ok(state.registrations.len() != before)
        })
    }

    fn assign_instructor(&mut self, course_id: &str, instructor_id: &str) -> StoreResult<()> {
        self.mutate("course_assign_instructor", |state| {
            require_non_empty("instructor_id", instructor_id)?;
            state.course_mut(course_id)?;
            state.ensure_instructor(instructor_id)?;
            state.course_mut(course_id)?.instructor_id = Some(instructor_id.to_string());
            Ok(())
        })
    }

    fn get_student(&self, student_id: &str) -> StoreResult<Option<Student>> {
        Ok(self
            .list_students(&RecordFilter::by_id(student_id))?
            .into_iter()
            .next())
    }

    fn get_instructor(&self, instructor_id: &str) -> StoreResult<Option<Instructor>> {
        Ok(self
            .list_instructors(&RecordFilter::by_id(instructor_id))?
            .into_iter()
            .next())
    }

    fn get_course(&self, course_id: &str) -> StoreResult<Option<Course>> {
        Ok(self
            .list_courses(&RecordFilter::by_id(course_id))?
            .into_iter()
            .next())
    }

    fn list_students(&self, filter: &RecordFilter) -> StoreResult<Vec<Student>> {
        Ok(self.state.students_matching(filter))
    }

    fn list_instructors(&self, filter: &RecordFilter) -> StoreResult<Vec<Instructor>> {
        Ok(self.state.instructors_matching(filter))
    }

    fn list_courses(&self, filter: &RecordFilter) -> StoreResult<Vec<Course>> {
        Ok(self.state.courses_matching(filter))
    }

    fn list_registrations(&self) -> StoreResult<Vec<Registration>> {
        Ok(self.state.registrations.clone())
    }
}

/// Authoritative rows; derived views are computed from them on read.
#[derive(Debug, Clone, Default)]
struct DocumentState {
    students: Vec<PersonRow>,
    instructors: Vec<PersonRow>,
    courses: Vec<CourseRef>,
    registrations: Vec<Registration>,
}

impl DocumentState {
    fn from_document(document: &RecordDocument) -> StoreResult<Self> {
        let mut state = Self::default();
        for entry in &document.students {
            let loaded = entry.to_student().map_err(StoreError::from).and_then(|student| {
                insert_person(
                    &mut state.students,
                    RecordKind::Student,
                    &student.student_id,
                    &student.person,
                )
            });
            loaded.map_err(|err| invalid(RecordKind::Student, &entry.student_id, err))?;
        }
        for entry in &document.instructors {
            let loaded = entry
                .to_instructor()
                .map_err(StoreError::from)
                .and_then(|instructor| {
                    insert_person(
                        &mut state.instructors,
                        RecordKind::Instructor,
                        &instructor.instructor_id,
                        &instructor.person,
                    )
                });
            loaded.map_err(|err| invalid(RecordKind::Instructor, &entry.instructor_id, err))?;
        }
        for course in &document.courses {
            state
                .insert_course(course)
                .map_err(|err| invalid(RecordKind::Course, &course.course_id, err))?;
        }
        for registration in &document.registrations {
            state
                .register(registration.clone())
                .map_err(|err| invalid(RecordKind::Registration, &registration.key(), err))?;
        }
        Ok(state)
    }

    fn to_document(&self) -> RecordDocument {
        let all = RecordFilter::default();
        RecordDocument::from_records(
            &self.students_matching(&all),
            &self.instructors_matching(&all),
            &self.courses_matching(&all),
            self.registrations.clone(),
        )
    }

    fn has_course(&self, course_id: &str) -> bool {
        self.courses.iter().any(|course| course.course_id == course_id)
    }

    fn course_ref(&self, course_id: &str) -> Option<&CourseRef> {
        self.courses.iter().find(|course| course.course_id == course_id)
    }

    fn course_mut(&mut self, course_id: &str) -> StoreResult<&mut CourseRef> {
        self.courses
            .iter_mut()
            .find(|course| course.course_id == course_id)
            .ok_or_else(|| StoreError::NotFound {
                kind: RecordKind::Course,
                id: course_id.to_string(),
            })
    }

    fn ensure_instructor(&self, instructor_id: &str) -> StoreResult<()> {
        if position(&self.instructors, instructor_id).is_none() {
            return Err(ConstraintError::UnknownInstructor(instructor_id.to_string()).into());
        }
        Ok(())
    }

    fn insert_course(&mut self, course: &CourseRef) -> StoreResult<()> {
        course.validate()?;
        if self.has_course(&course.course_id) {
            return Err(ConstraintError::DuplicateId {
                kind: RecordKind::Course,
                id: course.course_id.clone(),
            }
            .into());
        }
        if let Some(instructor_id) = &course.instructor_id {
            self.ensure_instructor(instructor_id)?;
        }
        self.courses.push(course.clone());
        Ok(())
    }

    fn register(&mut self, registration: Registration) -> StoreResult<()> {
        registration.validate()?;
        if position(&self.students, &registration.student_id).is_none() {
            return Err(ConstraintError::UnknownStudent(registration.student_id).into());
        }
        if !self.has_course(&registration.course_id) {
            return Err(ConstraintError::UnknownCourse(registration.course_id).into());
        }
        if self.registrations.contains(&registration) {
            return Err(ConstraintError::DuplicateRegistration {
                student_id: registration.student_id,
                course_id: registration.course_id,
            }
            .into());
        }
        self.registrations.push(registration);
        Ok(())
    }

    fn students_matching(&self, filter: &RecordFilter) -> Vec<Student> {
        self.students
            .iter()
            .filter(|(id, person)| filter.matches(id, &person.name))
            .map(|(id, person)| Student {
                student_id: id.clone(),
                person: person.clone(),
                registered_courses: self
                    .registrations
                    .iter()
                    .filter(|registration| &registration.student_id == id)
                    .filter_map(|registration| self.course_ref(&registration.course_id))
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    fn instructors_matching(&self, filter: &RecordFilter) -> Vec<Instructor> {
        self.instructors
            .iter()
            .filter(|(id, person)| filter.matches(id, &person.name))
            .map(|(id, person)| Instructor {
                instructor_id: id.clone(),
                person: person.clone(),
                assigned_courses: self
                    .courses
                    .iter()
                    .filter(|course| course.instructor_id.as_ref() == Some(id))
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    fn courses_matching(&self, filter: &RecordFilter) -> Vec<Course> {
        self.courses
            .iter()
            .filter(|course| filter.matches(&course.course_id, &course.course_name))
            .map(|course| {
                let enrolled = self
                    .registrations
                    .iter()
                    .filter(|registration| registration.course_id == course.course_id)
                    .map(|registration| registration.student_id.clone())
                    .collect();
                Course::from_ref(course.clone(), enrolled)
            })
            .collect()
    }
}

fn position(people: &[PersonRow], id: &str) -> Option<usize> {
    people.iter().position(|(person_id, _)| person_id == id)
}

fn not_found(kind: RecordKind, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn insert_person(
    people: &mut Vec<PersonRow>,
    kind: RecordKind,
    id: &str,
    fields: &PersonFields,
) -> StoreResult<()> {
    if position(people, id).is_some() {
        return Err(ConstraintError::DuplicateId {
            kind,
            id: id.to_string(),
        }
        .into());
    }
    people.push((id.to_string(), fields.clone()));
    Ok(())
}

fn edit_person(
    people: &mut [PersonRow],
    kind: RecordKind,
    id: &str,
    patch: &PersonPatch,
) -> StoreResult<()> {
    patch.validate()?;
    let index = position(people, id).ok_or_else(|| not_found(kind, id))?;
    people[index].1.apply(patch)?;
    Ok(())
}

fn rename_person(
    people: &mut [PersonRow],
    kind: RecordKind,
    id_field: &'static str,
    id: &str,
    new_id: &str,
) -> StoreResult<()> {
    require_non_empty(id_field, new_id)?;
    let index = position(people, id).ok_or_else(|| not_found(kind, id))?;
    if id == new_id {
        return Ok(());
    }
    if position(people, new_id).is_some() {
        return Err(ConstraintError::DuplicateId {
            kind,
            id: new_id.to_string(),
        }
        .into());
    }
    people[index].0 = new_id.to_string();
    Ok(())
}

fn remove_person(people: &mut Vec<PersonRow>, id: &str) -> bool {
    let before = people.len();
    people.retain(|(person_id, _)| person_id != id);
    people.len() != before
}

fn invalid(kind: RecordKind, id: &str, err: StoreError) -> StoreError {
    StoreError::InvalidData(format!("{kind} `{id}`: {err}"))
}
