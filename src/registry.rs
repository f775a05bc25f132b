//! Registered-credential set.
//!
//! Pure in-memory data structure; persistence and mutation arbitration live
//! in [`crate::service::LotService`], which owns the single consistency
//! boundary. The persisted document form is a JSON object `{uid: true}`, the
//! layout the controller has always written.

use std::collections::{BTreeMap, BTreeSet};

use crate::credential::Credential;

#[derive(Debug, Default)]
pub struct CredentialRegistry {
    known: BTreeSet<Credential>,
}

impl CredentialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the persisted document. Entries flagged `false` are
    /// treated as unregistered and dropped.
    pub fn from_document(doc: BTreeMap<String, bool>) -> Self {
        let known = doc
            .into_iter()
            .filter(|(_, registered)| *registered)
            .map(|(uid, _)| Credential::from(uid))
            .collect();
        Self { known }
    }

    pub fn to_document(&self) -> BTreeMap<String, bool> {
        self.known
            .iter()
            .map(|cred| (cred.as_str().to_string(), true))
            .collect()
    }

    pub fn is_registered(&self, cred: &Credential) -> bool {
        self.known.contains(cred)
    }

    /// Returns false if the credential was already registered.
    pub fn insert(&mut self, cred: Credential) -> bool {
        self.known.insert(cred)
    }

    /// Returns false if the credential was not registered.
    pub fn remove(&mut self, cred: &Credential) -> bool {
        self.known.remove(cred)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
