//! Reservation ledger: credentials holding an advisory claim on future
//! capacity, not a specific slot.
//!
//! Like [`crate::registry::CredentialRegistry`] this is a pure in-memory set;
//! the eligibility checks (registered, capacity available) and persistence
//! happen inside the service's critical section. Persisted document form is a
//! JSON array of uid strings.

use std::collections::BTreeSet;

use crate::credential::Credential;

#[derive(Debug, Default)]
pub struct ReservationLedger {
    reserved: BTreeSet<Credential>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(doc: Vec<String>) -> Self {
        let reserved = doc.into_iter().map(Credential::from).collect();
        Self { reserved }
    }

    pub fn to_document(&self) -> Vec<String> {
        self.reserved
            .iter()
            .map(|cred| cred.as_str().to_string())
            .collect()
    }

    pub fn is_reserved(&self, cred: &Credential) -> bool {
        self.reserved.contains(cred)
    }

    /// Returns false if the credential already held a reservation.
    pub fn insert(&mut self, cred: Credential) -> bool {
        self.reserved.insert(cred)
    }

    /// Remove a reservation if present. Idempotent: exit and unregister flows
    /// call this defensively, so absence is not an error.
    pub fn release(&mut self, cred: &Credential) -> bool {
        self.reserved.remove(cred)
    }

    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }
}
