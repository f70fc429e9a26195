//! Seed data loading
//!
//! Reads a JSON array of records used to pre-populate a server:
//!
//! ```json
//! [
//!   { "name": "John Doe", "email": "john@test.com", "phone": "555-1234", "birth_date": "1990-05-15" }
//! ]
//! ```
//!
//! `phone` may be omitted. Validation happens when records are created, see
//! [`crate::service::PatientService::seed`].

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{PatientDbError, Result};
use crate::model::PatientFields;

/// One record of a seed file
#[derive(Debug, Clone, Deserialize)]
pub struct SeedPatient {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
}

impl From<SeedPatient> for PatientFields {
    fn from(seed: SeedPatient) -> Self {
        PatientFields {
            name: seed.name,
            email: seed.email,
            phone: seed.phone,
            birth_date: seed.birth_date,
        }
    }
}

/// Parse seed records from JSON text
pub fn parse_seed(json: &str) -> Result<Vec<SeedPatient>> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a seed file
pub fn load_seed_file(path: &Path) -> Result<Vec<SeedPatient>> {
    let json = fs::read_to_string(path).map_err(|e| {
        PatientDbError::Seed(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_seed(&json)
}
