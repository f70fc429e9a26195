//! Repository Module
//!
//! Storage abstraction for patient records.
//!
//! ## Responsibilities
//! - Own the record collection
//! - Assign ids exactly once, on first save
//! - Answer lookups (by id, email, name fragment)
//!
//! A repository never rejects on business grounds; uniqueness and existence
//! rules live in [`crate::service::PatientService`]. Implementations are not
//! required to be internally synchronized: the service serializes access.
//!
//! ## Ordering
//! `find_all` and `find_by_name_containing` return records in ascending id
//! order, which is creation order. Persistent backends must keep this order,
//! since list replies are interpreted positionally by clients.

mod memory;

pub use memory::InMemoryPatientRepository;

use crate::error::Result;
use crate::model::Patient;

/// Storage contract for patient records
///
/// Methods return `Result` so persistent backends can surface storage
/// faults; the in-memory implementation never fails.
pub trait PatientRepository: Send + Sync {
    /// Insert (no id yet) or overwrite (id present). Returns the stored record.
    fn save(&mut self, patient: Patient) -> Result<Patient>;

    fn find_by_id(&self, id: u64) -> Result<Option<Patient>>;

    /// All records in ascending id order
    fn find_all(&self) -> Result<Vec<Patient>>;

    /// Remove the record if present; absent ids are a no-op
    fn delete(&mut self, id: u64) -> Result<()>;

    /// Case-sensitive exact match
    fn exists_by_email(&self, email: &str) -> Result<bool>;

    /// Case-sensitive exact match
    fn find_by_email(&self, email: &str) -> Result<Option<Patient>>;

    /// Case-insensitive substring match on the name
    fn find_by_name_containing(&self, fragment: &str) -> Result<Vec<Patient>>;

    fn count(&self) -> Result<u64>;

    /// Remove every record and restart id assignment at 1
    fn clear(&mut self) -> Result<()>;
}
