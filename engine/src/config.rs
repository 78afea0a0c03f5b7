//! Engine settings.
//!
//! Every setting has a default, an allowed range and a description,
//! registered once in [`SETTINGS`]. A config is read from JSON (missing
//! keys take their default), optionally overridden from `CYCLENET_*`
//! environment variables, and validated before an engine accepts it.

use std::time::Duration;

use cyclenet_core::{
    CentralityOptions, SampleStrategy, DEFAULT_AUTO_THRESHOLD, DEFAULT_AVERAGE_SPEED_KMH,
    DEFAULT_SAMPLE_SIZE, MAX_AVERAGE_SPEED_KMH, MIN_AVERAGE_SPEED_KMH,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A setting failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{name}: cannot parse '{value}' from the environment")]
    BadEnvValue { name: &'static str, value: String },
}

/// Registry entry describing one setting.
#[derive(Debug, Clone, Copy)]
pub struct Setting {
    pub name: &'static str,
    pub env: &'static str,
    pub description: &'static str,
    pub min: f64,
    pub max: f64,
}

pub const SETTINGS: [Setting; 5] = [
    Setting {
        name: "average_speed_kmh",
        env: "CYCLENET_AVERAGE_SPEED_KMH",
        description: "Average cycling speed used for route travel-time estimates",
        min: MIN_AVERAGE_SPEED_KMH,
        max: MAX_AVERAGE_SPEED_KMH,
    },
    Setting {
        name: "auto_sample_threshold",
        env: "CYCLENET_AUTO_SAMPLE_THRESHOLD",
        description: "Node count above which the auto strategy samples high-degree sources",
        min: 1.0,
        max: 1_000_000.0,
    },
    Setting {
        name: "default_sample_size",
        env: "CYCLENET_DEFAULT_SAMPLE_SIZE",
        description: "Brandes sources used by sampled strategies when none is requested",
        min: 1.0,
        max: 100_000.0,
    },
    Setting {
        name: "centrality_timeout_ms",
        env: "CYCLENET_CENTRALITY_TIMEOUT_MS",
        description: "How long a caller waits for the centrality worker before giving up",
        min: 10.0,
        max: 3_600_000.0, // 1 hour
    },
    Setting {
        name: "critical_top_n",
        env: "CYCLENET_CRITICAL_TOP_N",
        description: "Number of critical nodes reported by rankings, 0 = all",
        min: 0.0,
        max: 10_000.0,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub average_speed_kmh: f64,
    pub auto_sample_threshold: usize,
    pub default_sample_size: usize,
    pub centrality_timeout_ms: u64,
    pub critical_top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            auto_sample_threshold: DEFAULT_AUTO_THRESHOLD,
            default_sample_size: DEFAULT_SAMPLE_SIZE,
            centrality_timeout_ms: 30_000,
            critical_top_n: 10,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config. Missing keys take their default.
    pub fn from_json_str(json: &str) -> Result<Self, crate::EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by any `CYCLENET_*` variable that is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (keyed by each setting's env name), then validate.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for setting in &SETTINGS {
            let Some(raw) = lookup(setting.env) else {
                continue;
            };
            let value: f64 = raw.trim().parse().map_err(|_| ConfigError::BadEnvValue {
                name: setting.name,
                value: raw.clone(),
            })?;
            check_range(setting, value)?;
            match setting.name {
                "average_speed_kmh" => self.average_speed_kmh = value,
                "auto_sample_threshold" => self.auto_sample_threshold = value as usize,
                "default_sample_size" => self.default_sample_size = value as usize,
                "centrality_timeout_ms" => self.centrality_timeout_ms = value as u64,
                "critical_top_n" => self.critical_top_n = value as usize,
                _ => {}
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for setting in &SETTINGS {
            check_range(setting, self.value_of(setting.name))?;
        }
        Ok(())
    }

    fn value_of(&self, name: &str) -> f64 {
        match name {
            "average_speed_kmh" => self.average_speed_kmh,
            "auto_sample_threshold" => self.auto_sample_threshold as f64,
            "default_sample_size" => self.default_sample_size as f64,
            "centrality_timeout_ms" => self.centrality_timeout_ms as f64,
            "critical_top_n" => self.critical_top_n as f64,
            _ => f64::NAN,
        }
    }

    pub fn centrality_timeout(&self) -> Duration {
        Duration::from_millis(self.centrality_timeout_ms)
    }

    /// Centrality options for `strategy`, falling back to the configured sample size.
    pub fn centrality_options(
        &self,
        strategy: SampleStrategy,
        sample_size: Option<usize>,
    ) -> CentralityOptions {
        CentralityOptions::new(strategy, sample_size.unwrap_or(self.default_sample_size))
            .with_auto_threshold(self.auto_sample_threshold)
    }
}

fn check_range(setting: &Setting, value: f64) -> Result<(), ConfigError> {
    // NaN fails both comparisons and is rejected.
    if value >= setting.min && value <= setting.max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name: setting.name,
            value,
            min: setting.min,
            max: setting.max,
        })
    }
}
