//! lotkeeper: slot and reservation authority for an RFID parking gate.

mod credential;
mod ledger;
mod registry;
mod slots;
mod store;

pub mod config;
pub mod gate;
pub mod lanes;
pub mod service;
pub mod transport;

pub use credential::Credential;
pub use ledger::ReservationLedger;
pub use registry::CredentialRegistry;
pub use slots::SlotTable;
pub use store::{JsonStore, StoreError};

pub use config::LotConfig;
pub use gate::{DisplayPanel, GateActuator, LoggingDisplay, LoggingGate};
pub use lanes::{
    CredentialReader, EntryLane, ExitLane, PresenceSensor, RegistrationAction, RegistrationLane,
};
pub use service::{ArbitrationError, LotService, LotSnapshot};
