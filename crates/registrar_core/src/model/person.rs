//! Shared identity fields for people and the `Person` capability.
//!
//! Students and instructors embed [`PersonFields`] instead of inheriting from
//! a common base; behaviour that differs per role lives on the [`Person`]
//! trait.

use super::validation::{
    parse_age, require_non_empty, validate_age, validate_email, ValidationResult,
};

/// Validated name, age and email shared by students and instructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonFields {
    pub name: String,
    /// Always greater than zero once validated.
    pub age: i64,
    pub email: String,
}

impl PersonFields {
    /// Builds person fields, rejecting empty names, non-positive ages and
    /// malformed emails.
    pub fn new(
        name: impl Into<String>,
        age: i64,
        email: impl Into<String>,
    ) -> ValidationResult<Self> {
        let fields = Self {
            name: name.into(),
            age,
            email: email.into(),
        };
        fields.validate()?;
        Ok(fields)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_non_empty("name", &self.name)?;
        validate_age(self.age)?;
        validate_email(&self.email)?;
        Ok(())
    }

    /// Applies a validated patch. Nothing is changed when any supplied field
    /// is invalid.
    pub fn apply(&mut self, patch: &PersonPatch) -> ValidationResult<()> {
        patch.validate()?;
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        Ok(())
    }
}

/// Partial update for person fields. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonPatch {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub email: Option<String>,
}

impl PersonPatch {
    /// Builds a patch from raw form text where an empty entry means "keep".
    ///
    /// Age text is parsed here so a non-numeric age fails before any write.
    pub fn from_form(name: &str, age: &str, email: &str) -> ValidationResult<Self> {
        let age = if age.trim().is_empty() {
            None
        } else {
            Some(parse_age(age)?)
        };
        Ok(Self {
            name: non_empty(name),
            age,
            email: non_empty(email),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.email.is_none()
    }

    /// Validates only the fields this patch supplies.
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(age) = self.age {
            validate_age(age)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

/// Capability shared by every person-like record.
pub trait Person {
    fn person(&self) -> &PersonFields;

    /// Primary identity of the record within its own collection.
    fn record_id(&self) -> &str;

    /// One-paragraph self description used by listing views.
    fn introduce(&self) -> String;

    fn name(&self) -> &str {
        &self.person().name
    }

    fn age(&self) -> i64 {
        self.person().age
    }

    fn email(&self) -> &str {
        &self.person().email
    }
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub(crate) fn describe_courses<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let joined = names.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined
    }
}
