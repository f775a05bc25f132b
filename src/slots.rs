//! Fixed-size table of physical parking slots.
//!
//! The authoritative occupancy state. Purely in-memory: the table is rebuilt
//! empty at every process start, so a restart silently frees all slots in the
//! model while vehicles remain parked. Known gap, inherited from the original
//! controller, left as-is.

use crate::credential::Credential;

#[derive(Debug)]
pub struct SlotTable {
    slots: Vec<Option<Credential>>,
}

impl SlotTable {
    pub fn new(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    /// Lowest-indexed empty slot. The deterministic tie-break keeps behavior
    /// reproducible under test.
    pub fn find_empty(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.is_none())
    }

    pub fn find_by_credential(&self, cred: &Credential) -> Option<usize> {
        self.slots.iter().position(|slot| slot.as_ref() == Some(cred))
    }

    /// Mark `index` occupied. The caller guarantees the slot was empty —
    /// arbitration always pairs this with a `find_empty` under the same lock.
    pub fn occupy(&mut self, index: usize, cred: Credential) {
        debug_assert!(self.slots[index].is_none(), "slot {index} double-assigned");
        self.slots[index] = Some(cred);
    }

    pub fn vacate(&mut self, index: usize) {
        self.slots[index] = None;
    }

    pub fn occupant(&self, index: usize) -> Option<&Credential> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn available_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.len() - self.available_count()
    }

    pub fn total_count(&self) -> usize {
        self.slots.len()
    }

    pub fn occupants(&self) -> &[Option<Credential>] {
        &self.slots
    }
}
