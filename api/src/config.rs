//! Boundary configuration.

use std::collections::HashMap;
use std::path::Path;

use card2card_common::Pan;
use card2card_engine::EngineConfig;

/// HTTP boundary configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Log level for the env-filter default.
    pub log_level: String,
    /// Optional JSON file overriding the seed balances:
    /// `{ "<pan>": <balance>, ... }`.
    pub seed_file: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 5500,
            log_level: "info".to_string(),
            seed_file: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("CARD2CARD_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(port) = std::env::var("CARD2CARD_LISTEN_PORT") {
            if let Ok(port) = port.parse() {
                config.listen_port = port;
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        if let Ok(path) = std::env::var("ACCOUNT_SEED_FILE") {
            config.seed_file = Some(path);
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }
        Ok(())
    }

    /// Build the engine configuration, applying the seed file override
    /// if one is configured.
    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = EngineConfig::default();

        if let Some(path) = &self.seed_file {
            let mut seeds = load_seed_file(path)?;
            // The commission account always exists, even when a custom
            // seed omits it.
            if !seeds.iter().any(|(pan, _)| pan == &config.commission_account) {
                seeds.push((config.commission_account.clone(), 0));
            }
            config.seed_accounts = seeds;
        }

        config
            .validate()
            .map_err(|message| anyhow::anyhow!("Configuration error: {message}"))?;
        Ok(config)
    }
}

fn load_seed_file(path: impl AsRef<Path>) -> anyhow::Result<Vec<(Pan, i64)>> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let table: HashMap<String, i64> = serde_json::from_str(&contents)?;
    Ok(table
        .into_iter()
        .map(|(pan, balance)| (Pan::new(pan), balance))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.engine_config().is_ok());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = ApiConfig::default();
        config.listen_port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_seed_file_is_an_error() {
        let mut config = ApiConfig::default();
        config.seed_file = Some("/nonexistent/seed.json".to_string());
        assert!(config.engine_config().is_err());
    }
}
