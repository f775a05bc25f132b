//! Runtime configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LotConfig {
    /// Number of physical parking slots.
    pub slot_count: usize,
    /// Directory holding `registry.json` and `reservations.json`.
    pub data_dir: PathBuf,
    /// How long the gate stays open between the open and close commands.
    pub gate_hold: Duration,
    pub host: String,
    pub port: u16,
}

impl Default for LotConfig {
    fn default() -> Self {
        Self {
            slot_count: 4,
            data_dir: PathBuf::from("data"),
            gate_hold: Duration::from_secs(1),
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl LotConfig {
    /// Read configuration from `LOT_*` environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("LOT_SLOTS") {
            config.slot_count = v
                .parse()
                .map_err(|_| anyhow::anyhow!("LOT_SLOTS must be a positive integer, got {v:?}"))?;
            if config.slot_count == 0 {
                anyhow::bail!("LOT_SLOTS must be at least 1");
            }
        }
        if let Some(v) = lookup("LOT_DATA_DIR") {
            config.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("LOT_GATE_HOLD_MS") {
            let ms: u64 = v
                .parse()
                .map_err(|_| anyhow::anyhow!("LOT_GATE_HOLD_MS must be an integer, got {v:?}"))?;
            config.gate_hold = Duration::from_millis(ms);
        }
        if let Some(v) = lookup("LOT_HOST") {
            config.host = v;
        }
        if let Some(v) = lookup("LOT_PORT") {
            config.port = v
                .parse()
                .map_err(|_| anyhow::anyhow!("LOT_PORT must be a port number, got {v:?}"))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_controller() {
        let config = LotConfig::default();
        assert_eq!(config.slot_count, 4);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.gate_hold, Duration::from_secs(1));
    }

    #[test]
    fn lookup_overrides_apply() {
        let config = LotConfig::from_lookup(|key| match key {
            "LOT_SLOTS" => Some("8".to_string()),
            "LOT_PORT" => Some("8080".to_string()),
            "LOT_GATE_HOLD_MS" => Some("250".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.slot_count, 8);
        assert_eq!(config.port, 8080);
        assert_eq!(config.gate_hold, Duration::from_millis(250));
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn zero_slots_is_rejected() {
        let result = LotConfig::from_lookup(|key| match key {
            "LOT_SLOTS" => Some("0".to_string()),
            _ => None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn unparseable_port_is_rejected() {
        let result = LotConfig::from_lookup(|key| match key {
            "LOT_PORT" => Some("not-a-port".to_string()),
            _ => None,
        });
        assert!(result.is_err());
    }
}
