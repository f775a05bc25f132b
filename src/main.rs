//! lotkeeperd: parking controller server binary.
//!
//! Wires the arbitration service to the HTTP surface. Hardware lane loops
//! (entry/exit sensors, RFID readers, registration buttons) attach through
//! the traits in `lotkeeper::lanes`; without driver integration this binary
//! runs the network surface against logging gate/display collaborators.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use lotkeeper::config::LotConfig;
use lotkeeper::gate::{DisplayPanel, GateActuator, LoggingDisplay, LoggingGate};
use lotkeeper::service::LotService;
use lotkeeper::transport::{AppState, ServerConfig, serve};

/// Initialize tracing with LOT_LOG and LOG_FORMAT support.
fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match std::env::var("LOT_LOG").as_deref() {
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("lotkeeper={level},lotkeeperd={level}"))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = LotConfig::from_env().context("invalid configuration")?;

    let gate: Arc<dyn GateActuator> = Arc::new(LoggingGate);
    let display: Arc<dyn DisplayPanel> = Arc::new(LoggingDisplay);

    let service = Arc::new(
        LotService::open(&config, Arc::clone(&gate), Arc::clone(&display))
            .with_context(|| format!("failed to load lot state from {:?}", config.data_dir))?,
    );

    tracing::info!("no lane hardware attached; entry/exit lanes idle");

    let server_config = ServerConfig {
        host: config.host.clone(),
        port: config.port,
    };
    let state = AppState {
        service,
        gate,
        reader: None,
    };

    serve(server_config, state).await
}
