//! Model Module
//!
//! The patient record and its validation rules.
//!
//! ## Responsibilities
//! - Validate name, email and birth date before a record exists
//! - Derive age and senior status from the birth date
//! - Keep identity (`id`) stable once the repository assigns it
//!
//! A `Patient` can only be obtained through [`Patient::new`], so every record
//! handed to the service layer is already valid.

mod patient;

pub use patient::{Patient, PatientFields};

use chrono::{Local, NaiveDate};

/// Age from which a patient counts as a senior
pub const SENIOR_AGE: u32 = 65;

/// Wire and seed format for dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's date in the server's local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
