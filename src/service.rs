//! LotService: transport-agnostic arbitration of entry, exit, and
//! reservation requests.
//!
//! This service owns:
//! - The slot table (authoritative occupancy state)
//! - The credential registry and reservation ledger, plus their stores
//! - Gate/display side effects on granted entry and exit
//!
//! Every operation serializes the full check → decide → mutate → persist
//! sequence behind one lock. Two concurrent entries must never both observe
//! the same empty slot, and two registry mutations must never race on the
//! persisted file. Gate actuation runs after the mutation commits, outside
//! the critical section, so a slow servo does not hold the lock.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::LotConfig;
use crate::credential::Credential;
use crate::gate::{DisplayPanel, GateActuator};
use crate::ledger::ReservationLedger;
use crate::registry::CredentialRegistry;
use crate::slots::SlotTable;
use crate::store::{JsonStore, StoreError};

/// The result vocabulary of every arbitration operation. None of these are
/// faults; they map 1:1 to network response codes and display messages.
#[derive(Debug, thiserror::Error)]
pub enum ArbitrationError {
    #[error("access denied: credential not registered")]
    AccessDenied,

    #[error("parking full")]
    ParkingFull,

    #[error("credential already holds a reservation")]
    AlreadyReserved,

    #[error("credential already registered")]
    AlreadyExists,

    #[error("credential not found")]
    NotFound,

    #[error("no occupancy record for credential")]
    UnauthorizedExit,

    #[error("credential not registered")]
    NotRegistered,

    /// Persisting the registry/ledger failed. The mutation is rolled back and
    /// prior in-memory state left intact.
    #[error("state persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

/// Point-in-time view of the lot for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct LotSnapshot {
    pub available_slots: usize,
    pub total_slots: usize,
    pub reserved: usize,
    pub slots: Vec<Option<Credential>>,
}

struct LotState {
    registry: CredentialRegistry,
    ledger: ReservationLedger,
    slots: SlotTable,
}

pub struct LotService {
    state: Mutex<LotState>,
    registry_store: JsonStore,
    ledger_store: JsonStore,
    gate: Arc<dyn GateActuator>,
    display: Arc<dyn DisplayPanel>,
    gate_hold: Duration,
}

impl LotService {
    /// Load persisted registry/ledger state and build the service. The slot
    /// table always starts empty; occupancy is not persisted across restarts.
    pub fn open(
        config: &LotConfig,
        gate: Arc<dyn GateActuator>,
        display: Arc<dyn DisplayPanel>,
    ) -> Result<Self, StoreError> {
        let registry_store = JsonStore::new(config.data_dir.join("registry.json"));
        let ledger_store = JsonStore::new(config.data_dir.join("reservations.json"));

        let registry = CredentialRegistry::from_document(registry_store.load()?);
        let ledger = ReservationLedger::from_document(ledger_store.load()?);

        tracing::info!(
            registered = registry.len(),
            reserved = ledger.len(),
            slots = config.slot_count,
            "lot state loaded"
        );

        Ok(Self {
            state: Mutex::new(LotState {
                registry,
                ledger,
                slots: SlotTable::new(config.slot_count),
            }),
            registry_store,
            ledger_store,
            gate: Arc::clone(&gate),
            display: Arc::clone(&display),
            gate_hold: config.gate_hold,
        })
    }

    /// Arbitrate a vehicle presenting `cred` at the entry lane. On grant,
    /// occupies the lowest-indexed empty slot and consumes any reservation
    /// the credential held — a walk-up vehicle and a reservation holder are
    /// treated identically here.
    pub async fn entry(&self, cred: &Credential) -> Result<usize, ArbitrationError> {
        let index = {
            let mut st = self.state.lock().await;

            if !st.registry.is_registered(cred) {
                tracing::warn!(%cred, "entry denied: not registered");
                return Err(ArbitrationError::AccessDenied);
            }
            let Some(index) = st.slots.find_empty() else {
                tracing::info!(%cred, "entry denied: parking full");
                return Err(ArbitrationError::ParkingFull);
            };

            st.slots.occupy(index, cred.clone());
            if st.ledger.release(cred)
                && let Err(e) = self.persist_ledger(&st)
            {
                st.ledger.insert(cred.clone());
                st.slots.vacate(index);
                return Err(e.into());
            }
            index
        };

        tracing::info!(%cred, slot = index, "entry granted");
        self.cycle_gate().await;
        self.display.show(&format!("Welcome: slot {index}")).await;
        Ok(index)
    }

    /// Arbitrate a vehicle presenting `cred` at the exit lane. Also clears
    /// any stale reservation for the credential.
    pub async fn exit(&self, cred: &Credential) -> Result<usize, ArbitrationError> {
        let index = {
            let mut st = self.state.lock().await;

            let Some(index) = st.slots.find_by_credential(cred) else {
                tracing::warn!(%cred, "exit denied: no occupancy record");
                return Err(ArbitrationError::UnauthorizedExit);
            };

            st.slots.vacate(index);
            if st.ledger.release(cred)
                && let Err(e) = self.persist_ledger(&st)
            {
                st.ledger.insert(cred.clone());
                st.slots.occupy(index, cred.clone());
                return Err(e.into());
            }
            index
        };

        tracing::info!(%cred, slot = index, "exit granted");
        self.cycle_gate().await;
        self.display.show("Goodbye").await;
        Ok(index)
    }

    /// Grant an advisory claim on future capacity. The capacity check is a
    /// point-in-time check only: a reservation does not hold a slot, and a
    /// holder arriving after the lot fills observes ParkingFull at entry.
    pub async fn reserve(&self, cred: &Credential) -> Result<(), ArbitrationError> {
        let mut st = self.state.lock().await;

        if !st.registry.is_registered(cred) {
            tracing::warn!(%cred, "reservation denied: not registered");
            return Err(ArbitrationError::NotRegistered);
        }
        if st.ledger.is_reserved(cred) {
            return Err(ArbitrationError::AlreadyReserved);
        }
        if st.slots.find_empty().is_none() {
            tracing::info!(%cred, "reservation denied: parking full");
            return Err(ArbitrationError::ParkingFull);
        }

        st.ledger.insert(cred.clone());
        if let Err(e) = self.persist_ledger(&st) {
            st.ledger.release(cred);
            return Err(e.into());
        }

        tracing::info!(%cred, "reservation granted");
        Ok(())
    }

    pub async fn cancel_reservation(&self, cred: &Credential) -> Result<(), ArbitrationError> {
        let mut st = self.state.lock().await;

        if !st.ledger.release(cred) {
            return Err(ArbitrationError::NotFound);
        }
        if let Err(e) = self.persist_ledger(&st) {
            st.ledger.insert(cred.clone());
            return Err(e.into());
        }

        tracing::info!(%cred, "reservation canceled");
        Ok(())
    }

    pub async fn register(&self, cred: &Credential) -> Result<(), ArbitrationError> {
        let mut st = self.state.lock().await;

        if !st.registry.insert(cred.clone()) {
            return Err(ArbitrationError::AlreadyExists);
        }
        if let Err(e) = self.persist_registry(&st) {
            st.registry.remove(cred);
            return Err(e.into());
        }

        tracing::info!(%cred, "credential registered");
        Ok(())
    }

    /// Remove a credential, cascading removal of any reservation it held.
    /// The ledger is persisted before the registry so a failure part-way
    /// leaves no document referencing an unregistered credential.
    pub async fn unregister(&self, cred: &Credential) -> Result<(), ArbitrationError> {
        let mut st = self.state.lock().await;

        if !st.registry.remove(cred) {
            return Err(ArbitrationError::NotFound);
        }
        let had_reservation = st.ledger.release(cred);

        if had_reservation
            && let Err(e) = self.persist_ledger(&st)
        {
            st.ledger.insert(cred.clone());
            st.registry.insert(cred.clone());
            return Err(e.into());
        }
        if let Err(e) = self.persist_registry(&st) {
            st.registry.insert(cred.clone());
            if had_reservation {
                st.ledger.insert(cred.clone());
                if let Err(e) = self.persist_ledger(&st) {
                    tracing::error!(error = %e, "failed to restore ledger after aborted unregister");
                }
            }
            return Err(e.into());
        }

        tracing::info!(%cred, cascaded_reservation = had_reservation, "credential unregistered");
        Ok(())
    }

    pub async fn is_registered(&self, cred: &Credential) -> bool {
        self.state.lock().await.registry.is_registered(cred)
    }

    pub async fn is_reserved(&self, cred: &Credential) -> bool {
        self.state.lock().await.ledger.is_reserved(cred)
    }

    pub async fn snapshot(&self) -> LotSnapshot {
        let st = self.state.lock().await;
        LotSnapshot {
            available_slots: st.slots.available_count(),
            total_slots: st.slots.total_count(),
            reserved: st.ledger.len(),
            slots: st.slots.occupants().to_vec(),
        }
    }

    /// Open → hold → close on the single physical actuator, strictly in
    /// sequence.
    async fn cycle_gate(&self) {
        self.gate.open().await;
        tokio::time::sleep(self.gate_hold).await;
        self.gate.close().await;
    }

    fn persist_registry(&self, st: &LotState) -> Result<(), StoreError> {
        self.registry_store.save(&st.registry.to_document())
    }

    fn persist_ledger(&self, st: &LotState) -> Result<(), StoreError> {
        self.ledger_store.save(&st.ledger.to_document())
    }
}
