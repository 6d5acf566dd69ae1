use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct SlipstreamConfig {
    /// Base address of the race server.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_countdown_from")]
    pub countdown_from: u8,
    /// Pause before the first countdown tick, so the start view is on
    /// screen before the digits begin to move.
    #[serde(default = "default_countdown_lead_in_ms")]
    pub countdown_lead_in_ms: u64,
}

impl Default for SlipstreamConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            poll_interval_ms: default_poll_interval_ms(),
            countdown_from: default_countdown_from(),
            countdown_lead_in_ms: default_countdown_lead_in_ms(),
        }
    }
}

fn default_server_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_countdown_from() -> u8 {
    3
}

fn default_countdown_lead_in_ms() -> u64 {
    1000
}

pub fn load_slipstream_config(folder: &str) -> Result<SlipstreamConfig, String> {
    let config_path = Path::new(folder).join("config.toml");
    if !config_path.exists() {
        info!(
            "config.toml not found, using defaults: {}",
            config_path.display()
        );
        return Ok(SlipstreamConfig::default());
    }

    let raw = fs::read_to_string(&config_path).map_err(|err| {
        format!(
            "Failed to read config.toml at {}: {}",
            config_path.display(),
            err
        )
    })?;

    toml::from_str::<SlipstreamConfig>(&raw).map_err(|err| {
        format!(
            "Failed to parse config.toml at {}: {}",
            config_path.display(),
            err
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SlipstreamConfig::default();
        assert_eq!(config.server_url, "http://localhost:3001");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.countdown_from, 3);
        assert_eq!(config.countdown_lead_in_ms, 1000);
    }

    #[test]
    fn test_partial_file_falls_back_per_field() {
        let config: SlipstreamConfig =
            toml::from_str(r#"server_url = "http://race.example:8080""#).unwrap();
        assert_eq!(config.server_url, "http://race.example:8080");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.countdown_from, 3);
    }
}
