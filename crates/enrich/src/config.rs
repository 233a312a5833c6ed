use serde::Deserialize;

use crate::error::EnrichError;

/// Run configuration for the enrichment orchestrator.
///
/// The throttle is a courtesy delay to the external catalog, applied after
/// each row's lookup sequence; a run over N eligible rows takes at least
/// N * throttle_ms. The timeout bounds every individual catalog call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnrichConfig {
    /// Delay after each row's lookup sequence, in milliseconds.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// Per-call request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Cap on eligible rows per run; 0 means no cap.
    #[serde(default)]
    pub max_rows: usize,
}

fn default_throttle_ms() -> u64 {
    80
}

fn default_timeout_secs() -> u64 {
    20
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
            timeout_secs: default_timeout_secs(),
            max_rows: 0,
        }
    }
}

impl EnrichConfig {
    pub fn from_toml(input: &str) -> Result<Self, EnrichError> {
        let config: EnrichConfig =
            toml::from_str(input).map_err(|e| EnrichError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EnrichError> {
        if self.timeout_secs == 0 {
            return Err(EnrichError::ConfigValidation(
                "timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
