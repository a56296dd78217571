//! Exact-match name/id filter across students, instructors and courses.

use crate::model::course::Course;
use crate::model::instructor::Instructor;
use crate::model::student::Student;
use rusqlite::types::Value;

/// Filter with optional exact-equality predicates, combined with AND.
///
/// With both fields absent the filter selects every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub name: Option<String>,
    pub id: Option<String>,
}

impl RecordFilter {
    /// Builds a filter from form text; empty entries mean "no condition".
    pub fn new(name: &str, id: &str) -> Self {
        Self {
            name: (!name.is_empty()).then(|| name.to_string()),
            id: (!id.is_empty()).then(|| id.to_string()),
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            id: None,
        }
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            name: None,
            id: Some(id.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.id.is_none()
    }

    /// Returns a `WHERE` clause over `ID`/`Name` columns plus its bind values.
    pub fn sql_predicate(&self) -> (String, Vec<Value>) {
        let mut clause = String::from(" WHERE 1 = 1");
        let mut bind_values = Vec::new();

        if let Some(name) = &self.name {
            clause.push_str(" AND Name = ?");
            bind_values.push(Value::Text(name.clone()));
        }
        if let Some(id) = &self.id {
            clause.push_str(" AND ID = ?");
            bind_values.push(Value::Text(id.clone()));
        }

        (clause, bind_values)
    }

    /// In-memory equivalent of [`RecordFilter::sql_predicate`].
    pub fn matches(&self, id: &str, name: &str) -> bool {
        self.name.as_deref().map_or(true, |expected| expected == name)
            && self.id.as_deref().map_or(true, |expected| expected == id)
    }
}

/// Rows selected by a [`RecordFilter`], one list per collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterResult {
    pub students: Vec<Student>,
    pub instructors: Vec<Instructor>,
    pub courses: Vec<Course>,
}

impl FilterResult {
    pub fn total(&self) -> usize {
        self.students.len() + self.instructors.len() + self.courses.len()
    }
}
