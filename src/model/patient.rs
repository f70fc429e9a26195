//! Patient record
//!
//! Validating constructor, derived age and id-based equality.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::{today, SENIOR_AGE};
use crate::error::{PatientDbError, Result};

/// Characters that would break reply framing if stored in a text field
const RESERVED_CHARS: [char; 3] = ['|', '\r', '\n'];

/// Caller-supplied fields of a record, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientFields {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
}

/// A validated patient record
///
/// Equality is identity: two records are equal when both carry the same
/// assigned `id`. Records without an id are never equal to anything.
#[derive(Debug, Clone)]
pub struct Patient {
    id: Option<u64>,
    name: String,
    email: String,
    phone: Option<String>,
    birth_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Patient {
    /// Validate `fields` and build an unsaved record.
    ///
    /// Fails with `Validation` on an empty name, an email without `@`, a
    /// birth date after today, or a text field containing `|` or a line break.
    /// An empty phone is stored as absent.
    pub fn new(fields: PatientFields) -> Result<Self> {
        let PatientFields {
            name,
            email,
            phone,
            birth_date,
        } = fields;

        if name.trim().is_empty() {
            return Err(PatientDbError::Validation("Name required".to_string()));
        }
        if !email.contains('@') {
            return Err(PatientDbError::Validation(
                "Valid email required".to_string(),
            ));
        }
        if birth_date > today() {
            return Err(PatientDbError::Validation(
                "Birth date cannot be future".to_string(),
            ));
        }

        let phone = phone.filter(|p| !p.trim().is_empty());

        check_reserved("Name", &name)?;
        check_reserved("Email", &email)?;
        if let Some(ref phone) = phone {
            check_reserved("Phone", phone)?;
        }

        let now = Utc::now();
        Ok(Self {
            id: None,
            name,
            email,
            phone,
            birth_date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Return this record carrying `id`.
    ///
    /// Intended for repository implementations assigning identity on first
    /// save; a record that already has an id keeps it.
    pub fn with_id(mut self, id: u64) -> Self {
        if self.id.is_none() {
            self.id = Some(id);
        }
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // =========================================================================
    // Derived Values
    // =========================================================================

    /// Whole years between the birth date and today
    pub fn age(&self) -> u32 {
        self.age_on(today())
    }

    /// Whole years between the birth date and `on`
    ///
    /// A birthday not yet reached in `on`'s year does not count.
    pub fn age_on(&self, on: NaiveDate) -> u32 {
        let born = self.birth_date;
        let mut years = on.year() - born.year();
        if (on.month(), on.day()) < (born.month(), born.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }

    pub fn is_senior(&self) -> bool {
        self.age() >= SENIOR_AGE
    }

    // =========================================================================
    // Service-side Mutation
    // =========================================================================

    /// Stamp both timestamps (record creation)
    pub(crate) fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
        self.updated_at = now;
    }

    /// Copy the mutable fields of `source`, keeping id and `created_at`
    pub(crate) fn apply_update(&mut self, source: Patient, now: DateTime<Utc>) {
        self.name = source.name;
        self.email = source.email;
        self.phone = source.phone;
        self.birth_date = source.birth_date;
        self.updated_at = now;
    }
}

impl PartialEq for Patient {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "Patient #{} ({} <{}>)", id, self.name, self.email),
            None => write!(f, "Patient (unsaved) ({} <{}>)", self.name, self.email),
        }
    }
}

fn check_reserved(field: &str, value: &str) -> Result<()> {
    if value.contains(RESERVED_CHARS) {
        return Err(PatientDbError::Validation(format!(
            "{} contains reserved characters",
            field
        )));
    }
    Ok(())
}
