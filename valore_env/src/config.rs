//! Settings read from the process environment.
//!
//! Every key has a `SIM_`-prefixed primary name and, where the deployment
//! historically used one, an unprefixed fallback.

use crate::error::EnvError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Default number of engines kept alive by the seed registry.
pub const DEFAULT_REGISTRY_CAPACITY: NonZeroUsize = match NonZeroUsize::new(4) {
    Some(capacity) => capacity,
    None => panic!("default registry capacity must be non-zero"),
};

/// Where dashboard data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataMode {
    /// Synthetic engine output (also accepted as "synthetic")
    Emulation,
    /// Static baseline tables only
    Mock,
}

impl DataMode {
    /// Parses a mode name. Anything that is not a synthetic alias is `Mock`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "emulation" | "synthetic" => DataMode::Emulation,
            _ => DataMode::Mock,
        }
    }

    /// Returns true if the synthetic engine should serve data.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, DataMode::Emulation)
    }
}

impl Default for DataMode {
    fn default() -> Self {
        DataMode::Emulation
    }
}

/// Runtime settings for the engine registry and its consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Seed for the shared engine (`None` = seeded from the current time)
    pub synthetic_seed: Option<u64>,

    /// Data source mode
    pub data_mode: DataMode,

    /// Maximum number of engines kept by the registry
    pub registry_capacity: NonZeroUsize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            synthetic_seed: None,
            data_mode: DataMode::default(),
            registry_capacity: DEFAULT_REGISTRY_CAPACITY,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, EnvError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup.
    ///
    /// A seed of `0` is treated the same as an unset seed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EnvError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| -> Option<(String, String)> {
            keys.iter().find_map(|key| {
                lookup(key)
                    .filter(|value| !value.trim().is_empty())
                    .map(|value| (key.to_string(), value))
            })
        };

        let synthetic_seed = match first(&["SIM_SYNTHETIC_SEED", "SYNTHETIC_SEED"]) {
            Some((key, value)) => {
                let seed: u64 = value
                    .trim()
                    .parse()
                    .map_err(|_| EnvError::invalid(key, value.clone()))?;
                (seed != 0).then_some(seed)
            }
            None => None,
        };

        let data_mode = first(&["SIM_DATA_MODE", "DATA_MODE"])
            .map(|(_, value)| DataMode::parse(&value))
            .unwrap_or_default();

        let registry_capacity = match first(&["SIM_REGISTRY_CAPACITY"]) {
            Some((key, value)) => {
                let capacity: usize = value
                    .trim()
                    .parse()
                    .map_err(|_| EnvError::invalid(key.clone(), value.clone()))?;
                NonZeroUsize::new(capacity).ok_or_else(|| EnvError::OutOfRange {
                    key,
                    reason: "registry must hold at least one engine".to_string(),
                })?
            }
            None => DEFAULT_REGISTRY_CAPACITY,
        };

        Ok(Self {
            synthetic_seed,
            data_mode,
            registry_capacity,
        })
    }
}
