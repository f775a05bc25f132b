//! Lane monitor loops: the hardware side of the control surface.
//!
//! Each physical lane is one long-running task that blocks on its sensor and
//! reader collaborators, hands the scanned credential to the service for
//! arbitration, and renders denials on the display. Blocking waits happen
//! entirely outside the service's critical section. A stuck read blocks only
//! its own lane — there is no cancel for a physical scan.

use std::sync::Arc;

use async_trait::async_trait;

use crate::credential::Credential;
use crate::gate::DisplayPanel;
use crate::service::{ArbitrationError, LotService};

/// Infra-red presence detector for one lane.
#[async_trait]
pub trait PresenceSensor: Send + Sync {
    /// Resolves when a vehicle is present in the lane. Returns false when the
    /// sensor is gone and the lane should shut down.
    async fn wait_for_vehicle(&self) -> bool;
}

/// RFID reader for one lane.
#[async_trait]
pub trait CredentialReader: Send + Sync {
    /// Blocks until a tag is presented. None means the reader is gone and the
    /// lane should shut down.
    async fn next_credential(&self) -> Option<Credential>;

    /// Single non-blocking poll, for the maintenance scan endpoint.
    async fn poll(&self) -> Option<Credential>;
}

/// Entry-lane monitor: presence → scan → arbitrate.
pub struct EntryLane {
    sensor: Arc<dyn PresenceSensor>,
    reader: Arc<dyn CredentialReader>,
    service: Arc<LotService>,
    display: Arc<dyn DisplayPanel>,
}

impl EntryLane {
    pub fn new(
        sensor: Arc<dyn PresenceSensor>,
        reader: Arc<dyn CredentialReader>,
        service: Arc<LotService>,
        display: Arc<dyn DisplayPanel>,
    ) -> Self {
        Self {
            sensor,
            reader,
            service,
            display,
        }
    }

    pub async fn run(self) {
        loop {
            if !self.sensor.wait_for_vehicle().await {
                break;
            }
            let Some(cred) = self.reader.next_credential().await else {
                break;
            };

            match self.service.entry(&cred).await {
                Ok(_) => {}
                Err(ArbitrationError::AccessDenied) => {
                    self.display.show("Access Denied").await;
                }
                Err(ArbitrationError::ParkingFull) => {
                    self.display.show("Parking Full").await;
                }
                Err(e) => {
                    tracing::error!(%cred, error = %e, "entry arbitration failed");
                    self.display.show("Try Again").await;
                }
            }
        }
        tracing::info!("entry lane shut down");
    }
}

/// Exit-lane monitor: presence → scan → arbitrate.
pub struct ExitLane {
    sensor: Arc<dyn PresenceSensor>,
    reader: Arc<dyn CredentialReader>,
    service: Arc<LotService>,
    display: Arc<dyn DisplayPanel>,
}

impl ExitLane {
    pub fn new(
        sensor: Arc<dyn PresenceSensor>,
        reader: Arc<dyn CredentialReader>,
        service: Arc<LotService>,
        display: Arc<dyn DisplayPanel>,
    ) -> Self {
        Self {
            sensor,
            reader,
            service,
            display,
        }
    }

    pub async fn run(self) {
        loop {
            if !self.sensor.wait_for_vehicle().await {
                break;
            }
            let Some(cred) = self.reader.next_credential().await else {
                break;
            };

            match self.service.exit(&cred).await {
                Ok(_) => {}
                Err(ArbitrationError::UnauthorizedExit) => {
                    self.display.show("Unauthorized Exit").await;
                }
                Err(e) => {
                    tracing::error!(%cred, error = %e, "exit arbitration failed");
                    self.display.show("Try Again").await;
                }
            }
        }
        tracing::info!("exit lane shut down");
    }
}

/// What a registration lane does with a scanned credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationAction {
    Enroll,
    Revoke,
}

/// Button-driven credential lifecycle lane: each scan at this reader enrolls
/// or revokes the credential, depending on which button the lane is wired to.
pub struct RegistrationLane {
    reader: Arc<dyn CredentialReader>,
    service: Arc<LotService>,
    display: Arc<dyn DisplayPanel>,
    action: RegistrationAction,
}

impl RegistrationLane {
    pub fn new(
        reader: Arc<dyn CredentialReader>,
        service: Arc<LotService>,
        display: Arc<dyn DisplayPanel>,
        action: RegistrationAction,
    ) -> Self {
        Self {
            reader,
            service,
            display,
            action,
        }
    }

    pub async fn run(self) {
        while let Some(cred) = self.reader.next_credential().await {
            let result = match self.action {
                RegistrationAction::Enroll => self.service.register(&cred).await,
                RegistrationAction::Revoke => self.service.unregister(&cred).await,
            };

            match (self.action, result) {
                (RegistrationAction::Enroll, Ok(())) => {
                    self.display.show("Card Registered").await;
                }
                (RegistrationAction::Revoke, Ok(())) => {
                    self.display.show("Card Removed").await;
                }
                (_, Err(ArbitrationError::AlreadyExists)) => {
                    self.display.show("Already Registered").await;
                }
                (_, Err(ArbitrationError::NotFound)) => {
                    self.display.show("Unknown Card").await;
                }
                (_, Err(e)) => {
                    tracing::error!(%cred, error = %e, "registration lane operation failed");
                    self.display.show("Try Again").await;
                }
            }
        }
        tracing::info!(action = ?self.action, "registration lane shut down");
    }
}
