//! Gate actuator and display panel collaborator seams.
//!
//! The servo driver and status panel are external hardware; the core talks to
//! them through these traits. Real implementations live with the GPIO/I2C
//! integration; the crate ships logging implementations so the server runs
//! without hardware attached.

use async_trait::async_trait;

/// Drives the single physical gate servo. Open and close are sequential
/// operations on one actuator and must never be issued concurrently — the
/// service sequences open → hold → close itself.
#[async_trait]
pub trait GateActuator: Send + Sync {
    async fn open(&self);
    async fn close(&self);
}

/// Status panel. Fire-and-forget: nothing in the core depends on the outcome
/// of a display write.
#[async_trait]
pub trait DisplayPanel: Send + Sync {
    async fn show(&self, message: &str);
}

/// Gate that only logs. Default for builds without an actuator attached.
#[derive(Debug, Default)]
pub struct LoggingGate;

#[async_trait]
impl GateActuator for LoggingGate {
    async fn open(&self) {
        tracing::info!("gate open");
    }

    async fn close(&self) {
        tracing::info!("gate close");
    }
}

/// Display that only logs.
#[derive(Debug, Default)]
pub struct LoggingDisplay;

#[async_trait]
impl DisplayPanel for LoggingDisplay {
    async fn show(&self, message: &str) {
        tracing::info!(message, "display");
    }
}
