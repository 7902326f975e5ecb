//! Engine configuration, loaded with Figment.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML config file
//! 3. Environment variables (CASEWORK_* prefix)

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable prefix for config overrides.
///
/// Example: `CASEWORK_JUSTIFICATION__REOPEN` -> `justification.reopen`
pub const ENV_PREFIX: &str = "CASEWORK_";

const DEFAULT_BULK_CONCURRENCY: usize = 8;
const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_DUE_SOON_DAYS: i64 = 7;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config extraction failed: {0}")]
    Extraction(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of items a bulk call works on at the same time
    pub bulk_concurrency: usize,
    /// Default timeout for each data-store call
    pub call_timeout_ms: u64,
    /// Activities due within this many days are DUE_SOON
    pub due_soon_days: i64,
    /// Reworking a legally rejected activity requires being its principal responsible
    pub rework_requires_responsible: bool,
    pub justification: JustificationPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bulk_concurrency: DEFAULT_BULK_CONCURRENCY,
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
            rework_requires_responsible: false,
            justification: JustificationPolicy::default(),
        }
    }
}

/// Minimum number of characters of justification text, per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JustificationPolicy {
    pub cancel: usize,
    pub transfer: usize,
    pub reopen: usize,
    /// Observations on a supervisor or legal rejection
    pub rejection: usize,
}

impl JustificationPolicy {
    /// Lowest lengths a deployment may configure. Settings can only make the
    /// rules stricter.
    pub const MINIMUM: JustificationPolicy = JustificationPolicy {
        cancel: 10,
        transfer: 15,
        reopen: 15,
        rejection: 10,
    };

    fn validate(&self) -> Result<(), ConfigError> {
        let floor = Self::MINIMUM;
        for (name, value, min) in [
            ("cancel", self.cancel, floor.cancel),
            ("transfer", self.transfer, floor.transfer),
            ("reopen", self.reopen, floor.reopen),
            ("rejection", self.rejection, floor.rejection),
        ] {
            if value < min {
                return Err(ConfigError::Invalid(format!(
                    "justification.{name} must be at least {min}, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for JustificationPolicy {
    fn default() -> Self {
        Self::MINIMUM
    }
}

impl EngineConfig {
    /// Load configuration from defaults, an optional TOML file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));
        if let Some(path) = path {
            info!(path = %path.display(), "loading engine configuration");
            figment = figment.merge(Toml::file(path));
        }

        let config: EngineConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Extraction(e.to_string()))?;
        config.validate()?;

        debug!(
            bulk_concurrency = config.bulk_concurrency,
            call_timeout_ms = config.call_timeout_ms,
            due_soon_days = config.due_soon_days,
            "engine configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bulk_concurrency == 0 {
            return Err(ConfigError::Invalid("bulk_concurrency must be at least 1".into()));
        }
        if self.call_timeout_ms == 0 {
            return Err(ConfigError::Invalid("call_timeout_ms must be at least 1".into()));
        }
        if self.due_soon_days < 0 {
            return Err(ConfigError::Invalid("due_soon_days must not be negative".into()));
        }
        self.justification.validate()
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.bulk_concurrency, 8);
        assert_eq!(config.due_soon_days, 7);
        assert_eq!(config.justification.cancel, 10);
        assert_eq!(config.justification.transfer, 15);
        assert_eq!(config.justification.reopen, 15);
        assert_eq!(config.justification.rejection, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "casework.toml",
                r#"
                bulk_concurrency = 3
                call_timeout_ms = 250

                [justification]
                reopen = 18
                "#,
            )?;
            jail.set_env("CASEWORK_CALL_TIMEOUT_MS", "900");

            let config = EngineConfig::load(Some(Path::new("casework.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.bulk_concurrency, 3);
            assert_eq!(config.call_timeout_ms, 900);
            assert_eq!(config.justification.reopen, 18);
            assert_eq!(config.justification.cancel, 10);
            Ok(())
        });
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("CASEWORK_BULK_CONCURRENCY", "0");
            let result = EngineConfig::load(None);
            assert!(matches!(result, Err(ConfigError::Invalid(_))));
            Ok(())
        });
    }

    #[test]
    fn test_justification_below_floor_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("CASEWORK_JUSTIFICATION__CANCEL", "0");
            let result = EngineConfig::load(None);
            assert!(matches!(result, Err(ConfigError::Invalid(ref m)) if m.contains("justification.cancel")));
            Ok(())
        });

        let mut config = EngineConfig::default();
        config.justification.reopen = 14;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_justification_can_be_made_stricter() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "casework.toml",
                r#"
                [justification]
                transfer = 40
                rejection = 25
                "#,
            )?;
            let config = EngineConfig::load(Some(Path::new("casework.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.justification.transfer, 40);
            assert_eq!(config.justification.rejection, 25);
            Ok(())
        });
    }
}
