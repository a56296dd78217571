//! SQL shared by the `Students` and `Instructors` tables.
//!
//! Both tables have the same `(ID, Name, Age, Email)` shape; the student and
//! instructor repositories delegate here with their table selector.

use super::{map_insert_error, row_exists, ConstraintError, RepoError, RepoResult};
use crate::model::person::{PersonFields, PersonPatch};
use crate::model::validation::require_non_empty;
use crate::model::RecordKind;
use crate::query::filter::RecordFilter;
use rusqlite::{params, params_from_iter, Connection, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PersonTable {
    Students,
    Instructors,
}

impl PersonTable {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Students => "Students",
            Self::Instructors => "Instructors",
        }
    }

    pub(crate) fn kind(self) -> RecordKind {
        match self {
            Self::Students => RecordKind::Student,
            Self::Instructors => RecordKind::Instructor,
        }
    }

    fn id_field(self) -> &'static str {
        match self {
            Self::Students => "student_id",
            Self::Instructors => "instructor_id",
        }
    }
}

/// One persisted person row: primary id plus validated fields.
pub(crate) type PersonRow = (String, PersonFields);

pub(crate) fn insert(
    conn: &Connection,
    table: PersonTable,
    id: &str,
    fields: &PersonFields,
) -> RepoResult<()> {
    require_non_empty(table.id_field(), id)?;
    fields.validate()?;

    if row_exists(conn, table.name(), id)? {
        return Err(ConstraintError::DuplicateId {
            kind: table.kind(),
            id: id.to_string(),
        }
        .into());
    }

    conn.execute(
        &format!(
            "INSERT INTO {} (ID, Name, Age, Email) VALUES (?1, ?2, ?3, ?4);",
            table.name()
        ),
        params![id, fields.name.as_str(), fields.age, fields.email.as_str()],
    )
    .map_err(|err| map_insert_error(err, table.kind(), id))?;

    Ok(())
}

/// Overwrites the supplied patch fields in a single statement.
pub(crate) fn update(
    conn: &Connection,
    table: PersonTable,
    id: &str,
    patch: &PersonPatch,
) -> RepoResult<()> {
    patch.validate()?;

    let changed = if patch.is_empty() {
        usize::from(row_exists(conn, table.name(), id)?)
    } else {
        conn.execute(
            &format!(
                "UPDATE {}
                 SET
                    Name = COALESCE(?2, Name),
                    Age = COALESCE(?3, Age),
                    Email = COALESCE(?4, Email)
                 WHERE ID = ?1;",
                table.name()
            ),
            params![
                id,
                patch.name.as_deref(),
                patch.age,
                patch.email.as_deref()
            ],
        )?
    };

    if changed == 0 {
        return Err(RepoError::NotFound {
            kind: table.kind(),
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Changes a primary id; foreign keys cascade it to dependent rows.
pub(crate) fn rename(
    conn: &Connection,
    table: PersonTable,
    id: &str,
    new_id: &str,
) -> RepoResult<()> {
    require_non_empty(table.id_field(), new_id)?;

    if !row_exists(conn, table.name(), id)? {
        return Err(RepoError::NotFound {
            kind: table.kind(),
            id: id.to_string(),
        });
    }
    if id == new_id {
        return Ok(());
    }
    if row_exists(conn, table.name(), new_id)? {
        return Err(ConstraintError::DuplicateId {
            kind: table.kind(),
            id: new_id.to_string(),
        }
        .into());
    }

    conn.execute(
        &format!("UPDATE {} SET ID = ?2 WHERE ID = ?1;", table.name()),
        params![id, new_id],
    )
    .map_err(|err| map_insert_error(err, table.kind(), new_id))?;

    Ok(())
}

/// Deletes one row. Returns whether a row existed.
pub(crate) fn delete(conn: &Connection, table: PersonTable, id: &str) -> RepoResult<bool> {
    let changed = conn.execute(
        &format!("DELETE FROM {} WHERE ID = ?1;", table.name()),
        [id],
    )?;
    Ok(changed > 0)
}

/// Lists rows matching `filter` in insertion order.
pub(crate) fn list(
    conn: &Connection,
    table: PersonTable,
    filter: &RecordFilter,
) -> RepoResult<Vec<PersonRow>> {
    let (predicate, bind_values) = filter.sql_predicate();
    let mut stmt = conn.prepare(&format!(
        "SELECT ID, Name, Age, Email FROM {}{predicate} ORDER BY rowid ASC;",
        table.name()
    ))?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;

    let mut people = Vec::new();
    while let Some(row) = rows.next()? {
        people.push(parse_person_row(table, row)?);
    }
    Ok(people)
}

fn parse_person_row(table: PersonTable, row: &Row<'_>) -> RepoResult<PersonRow> {
    let id: String = row.get("ID")?;
    let fields = PersonFields {
        name: row.get("Name")?,
        age: row.get("Age")?,
        email: row.get("Email")?,
    };
    fields.validate().map_err(|err| {
        RepoError::InvalidData(format!("{}.{id}: {err}", table.name()))
    })?;
    Ok((id, fields))
}
