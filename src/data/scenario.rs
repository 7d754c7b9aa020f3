//! Scenario documents: a snapshot of attackers, defenders and global
//! modifiers handed to the engine in one piece.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::combat::{Attacker, Defender, ModifierSet};
use crate::config::EngineConfig;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub modifiers: ModifierSet,
    #[serde(default)]
    pub attackers: Vec<Attacker>,
    #[serde(default)]
    pub defenders: Vec<Defender>,
    /// Die size override for this scenario.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sides: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_epsilon: Option<f64>,
}

impl Scenario {
    /// `base` with this scenario's overrides applied.
    pub fn engine_config(&self, base: &EngineConfig) -> EngineConfig {
        base.with_overrides(self.sides, self.trim_epsilon)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }
}

/// Load a scenario file: YAML for `.yaml`/`.yml`, JSON otherwise.
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    if is_yaml {
        Scenario::from_yaml_str(&raw)
    } else {
        Scenario::from_json_str(&raw)
    }
}
