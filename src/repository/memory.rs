//! In-memory repository
//!
//! BTreeMap keyed by id, so iteration order is creation order.

use std::collections::BTreeMap;

use super::PatientRepository;
use crate::error::Result;
use crate::model::Patient;

/// Default repository: records live in process memory only
#[derive(Debug)]
pub struct InMemoryPatientRepository {
    patients: BTreeMap<u64, Patient>,
    next_id: u64,
}

impl InMemoryPatientRepository {
    pub fn new() -> Self {
        Self {
            patients: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Default for InMemoryPatientRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientRepository for InMemoryPatientRepository {
    fn save(&mut self, patient: Patient) -> Result<Patient> {
        let id = match patient.id() {
            Some(id) => id,
            None => self.next_id,
        };
        // Explicit ids must never be handed out again by the counter
        self.next_id = self.next_id.max(id.saturating_add(1));

        let patient = patient.with_id(id);
        self.patients.insert(id, patient.clone());
        Ok(patient)
    }

    fn find_by_id(&self, id: u64) -> Result<Option<Patient>> {
        Ok(self.patients.get(&id).cloned())
    }

    fn find_all(&self) -> Result<Vec<Patient>> {
        Ok(self.patients.values().cloned().collect())
    }

    fn delete(&mut self, id: u64) -> Result<()> {
        self.patients.remove(&id);
        Ok(())
    }

    fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self.patients.values().any(|p| p.email() == email))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Patient>> {
        Ok(self.patients.values().find(|p| p.email() == email).cloned())
    }

    fn find_by_name_containing(&self, fragment: &str) -> Result<Vec<Patient>> {
        let needle = fragment.to_lowercase();
        Ok(self
            .patients
            .values()
            .filter(|p| p.name().to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<u64> {
        Ok(self.patients.len() as u64)
    }

    fn clear(&mut self) -> Result<()> {
        self.patients.clear();
        self.next_id = 1;
        Ok(())
    }
}
