//! Service Module
//!
//! The domain service that sits between the protocol and the repository.
//!
//! ## Responsibilities
//! - Enforce email uniqueness and record existence
//! - Stamp `created_at` / `updated_at`
//! - Derive age-based views (age range, seniors)
//! - Dispatch decoded commands
//! - Serialize concurrent access to the repository

use chrono::Utc;
use parking_lot::RwLock;

use crate::error::{PatientDbError, Result};
use crate::model::{Patient, PatientFields};
use crate::protocol::{Command, Response, EMPTY_LIST_MESSAGE, EMPTY_SEARCH_MESSAGE};
use crate::repository::{InMemoryPatientRepository, PatientRepository};
use crate::seed::SeedPatient;

/// The patient domain service
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (create/update/delete/clear): hold the write lock for the
///   whole check-then-write sequence, so two creates can never both pass a
///   stale uniqueness check and an update never races another update.
///
/// - **Reads** (get/list/search/count): hold the read lock; many run at once
///   and none observes a half-applied write.
///
/// `parking_lot` locks do not poison, so a panic inside one operation leaves
/// the service usable for every other connection.
pub struct PatientService {
    repository: RwLock<Box<dyn PatientRepository>>,
}

/// Outcome of loading seed records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

impl PatientService {
    /// Create a service over the given repository
    pub fn new(repository: impl PatientRepository + 'static) -> Self {
        Self {
            repository: RwLock::new(Box::new(repository)),
        }
    }

    /// Create a service over a fresh in-memory repository
    pub fn in_memory() -> Self {
        Self::new(InMemoryPatientRepository::new())
    }

    /// Execute a decoded command
    ///
    /// `EXIT` is a connection concern and never reaches the service.
    pub fn execute(&self, command: Command) -> Result<Response> {
        match command {
            Command::Create(fields) => {
                let created = self.create(Patient::new(fields)?)?;
                Ok(Response::Created(created))
            }
            Command::Get { id } => Ok(Response::Record(self.get_by_id(id)?)),
            Command::Update { id, fields } => {
                let updated = self.update(id, Patient::new(fields)?)?;
                Ok(Response::Record(updated))
            }
            Command::Delete { id } => {
                self.delete(id)?;
                Ok(Response::Deleted)
            }
            Command::List => Ok(Response::Listing {
                patients: self.get_all()?,
                empty_message: EMPTY_LIST_MESSAGE,
            }),
            Command::Search { fragment } => Ok(Response::Listing {
                patients: self.find_by_name(&fragment)?,
                empty_message: EMPTY_SEARCH_MESSAGE,
            }),
            Command::Count => Ok(Response::Count(self.count()?)),
            Command::Exit => Err(PatientDbError::Internal(
                "EXIT must be handled by the connection".to_string(),
            )),
        }
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Store a new record
    ///
    /// Fails with `Validation` if the email is already in use or the record
    /// already carries an id.
    pub fn create(&self, mut patient: Patient) -> Result<Patient> {
        if patient.id().is_some() {
            return Err(PatientDbError::Validation(
                "New patient must not have an id".to_string(),
            ));
        }

        let mut repo = self.repository.write();

        if repo.exists_by_email(patient.email())? {
            return Err(PatientDbError::Validation(format!(
                "Email already exists: {}",
                patient.email()
            )));
        }

        patient.stamp_created(Utc::now());
        let created = repo.save(patient)?;

        tracing::debug!("Created {}", created);
        Ok(created)
    }

    pub fn get_by_id(&self, id: u64) -> Result<Patient> {
        self.repository
            .read()
            .find_by_id(id)?
            .ok_or(PatientDbError::NotFound(id))
    }

    /// All records, ascending id
    pub fn get_all(&self) -> Result<Vec<Patient>> {
        self.repository.read().find_all()
    }

    /// Replace name, email, phone and birth date of record `id`
    ///
    /// Keeps `id` and `created_at`, refreshes `updated_at`. Fails with
    /// `NotFound` for an unknown id and `Validation` when the new email
    /// belongs to a different record.
    pub fn update(&self, id: u64, fields: Patient) -> Result<Patient> {
        let mut repo = self.repository.write();

        let mut existing = repo.find_by_id(id)?.ok_or(PatientDbError::NotFound(id))?;

        if existing.email() != fields.email() {
            if let Some(owner) = repo.find_by_email(fields.email())? {
                if owner.id() != Some(id) {
                    return Err(PatientDbError::Validation(format!(
                        "Email already exists: {}",
                        fields.email()
                    )));
                }
            }
        }

        existing.apply_update(fields, Utc::now());
        let updated = repo.save(existing)?;

        tracing::debug!("Updated {}", updated);
        Ok(updated)
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        let mut repo = self.repository.write();

        if repo.find_by_id(id)?.is_none() {
            return Err(PatientDbError::NotFound(id));
        }
        repo.delete(id)?;

        tracing::debug!("Deleted patient #{}", id);
        Ok(())
    }

    // =========================================================================
    // Search & Filter
    // =========================================================================

    /// Case-insensitive name search
    pub fn find_by_name(&self, fragment: &str) -> Result<Vec<Patient>> {
        self.repository.read().find_by_name_containing(fragment)
    }

    /// Records whose age lies in `min..=max`
    pub fn find_by_age_range(&self, min: u32, max: u32) -> Result<Vec<Patient>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|p| (min..=max).contains(&p.age()))
            .collect())
    }

    pub fn get_seniors(&self) -> Result<Vec<Patient>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(Patient::is_senior)
            .collect())
    }

    pub fn email_exists(&self, email: &str) -> Result<bool> {
        self.repository.read().exists_by_email(email)
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    pub fn count(&self) -> Result<u64> {
        self.repository.read().count()
    }

    /// Remove every record and restart ids at 1 (test isolation)
    pub fn clear(&self) -> Result<()> {
        self.repository.write().clear()
    }

    /// Create every valid, non-duplicate seed record
    ///
    /// Invalid or duplicate entries are logged and skipped.
    pub fn seed(&self, records: impl IntoIterator<Item = SeedPatient>) -> SeedReport {
        let mut report = SeedReport::default();

        for record in records {
            let email = record.email.clone();
            match Patient::new(PatientFields::from(record)).and_then(|p| self.create(p)) {
                Ok(_) => report.created += 1,
                Err(e) => {
                    tracing::warn!("Skipping seed record {}: {}", email, e);
                    report.skipped += 1;
                }
            }
        }

        report
    }
}

impl Default for PatientService {
    fn default() -> Self {
        Self::in_memory()
    }
}
