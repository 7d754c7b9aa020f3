//! Engine configuration with environment overrides.
//!
//! Every knob has a default that reproduces the standard six-sided game; the
//! binary layers `MATHHAMMER_*` environment variables on top, and scenario
//! documents may override `sides` and `trim_epsilon` per run.

use std::env;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SIDES: u32 = 6;

/// Largest trailing mass [crate::probability::trim_tail] may discard.
///
/// Trimming only removes tail entries whose exact mass is below this value and
/// whose combined mass stays below it, so every trimmed distribution still
/// sums to at least `1 - epsilon`. At 1e-9 the loss is invisible at display
/// precision while still cutting the long, near-zero tails that compound
/// expansions produce for large attack pools.
pub const DEFAULT_TRIM_EPSILON: f64 = 1e-9;

/// Largest trim epsilon accepted from the environment or a scenario.
pub const MAX_TRIM_EPSILON: f64 = 1e-3;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Faces on every hit/wound/save die.
    pub sides: u32,
    pub trim_epsilon: f64,
    /// Worker threads for batch resolution. 0 uses the Rayon default.
    pub workers: usize,
    pub bind_addr: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sides: DEFAULT_SIDES,
            trim_epsilon: DEFAULT_TRIM_EPSILON,
            workers: 0,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `MATHHAMMER_SIDES`, `MATHHAMMER_TRIM_EPSILON`,
    /// `MATHHAMMER_WORKERS` and `MATHHAMMER_BIND`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [EngineConfig::from_env] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let sides = parse_or_default(lookup("MATHHAMMER_SIDES"), "MATHHAMMER_SIDES", defaults.sides)
            .max(2);
        let trim_epsilon = parse_or_default(
            lookup("MATHHAMMER_TRIM_EPSILON"),
            "MATHHAMMER_TRIM_EPSILON",
            defaults.trim_epsilon,
        );
        let workers = parse_or_default(
            lookup("MATHHAMMER_WORKERS"),
            "MATHHAMMER_WORKERS",
            defaults.workers,
        );
        let bind_addr = lookup("MATHHAMMER_BIND").unwrap_or(defaults.bind_addr);

        Self {
            sides,
            trim_epsilon: if is_usable_epsilon(trim_epsilon) {
                trim_epsilon
            } else {
                tracing::warn!(
                    trim_epsilon,
                    max = MAX_TRIM_EPSILON,
                    "trim epsilon out of range, using default"
                );
                DEFAULT_TRIM_EPSILON
            },
            workers,
            bind_addr,
        }
    }

    /// Apply per-scenario overrides on top of this configuration.
    pub fn with_overrides(&self, sides: Option<u32>, trim_epsilon: Option<f64>) -> Self {
        Self {
            sides: sides.map(|s| s.max(2)).unwrap_or(self.sides),
            trim_epsilon: trim_epsilon
                .filter(|eps| is_usable_epsilon(*eps))
                .unwrap_or(self.trim_epsilon),
            ..self.clone()
        }
    }
}

/// Finite and within `0..=MAX_TRIM_EPSILON`.
pub fn is_usable_epsilon(epsilon: f64) -> bool {
    (0.0..=MAX_TRIM_EPSILON).contains(&epsilon)
}

fn parse_or_default<T>(raw: Option<String>, name: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match raw {
        None => default,
        Some(value) => value.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!("invalid {name} '{value}', defaulting to {default}");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = EngineConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn environment_values_override_defaults() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("MATHHAMMER_SIDES", "8"),
            ("MATHHAMMER_TRIM_EPSILON", "1e-6"),
            ("MATHHAMMER_WORKERS", "4"),
            ("MATHHAMMER_BIND", "0.0.0.0:8080"),
        ]));
        assert_eq!(config.sides, 8);
        assert_eq!(config.trim_epsilon, 1e-6);
        assert_eq!(config.workers, 4);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("MATHHAMMER_SIDES", "six"),
            ("MATHHAMMER_TRIM_EPSILON", "-1"),
        ]));
        assert_eq!(config.sides, DEFAULT_SIDES);
        assert_eq!(config.trim_epsilon, DEFAULT_TRIM_EPSILON);
    }

    #[test]
    fn scenario_overrides_are_applied_and_sanitised() {
        let base = EngineConfig::default();
        let over = base.with_overrides(Some(1), Some(1e-4));
        assert_eq!(over.sides, 2);
        assert_eq!(over.trim_epsilon, 1e-4);

        let ignored = base.with_overrides(None, Some(f64::NAN));
        assert_eq!(ignored.trim_epsilon, DEFAULT_TRIM_EPSILON);
        assert_eq!(ignored.sides, DEFAULT_SIDES);
    }

    #[test]
    fn oversized_trim_epsilon_is_refused() {
        let config = EngineConfig::from_lookup(lookup_from(&[("MATHHAMMER_TRIM_EPSILON", "0.5")]));
        assert_eq!(config.trim_epsilon, DEFAULT_TRIM_EPSILON);

        let over = EngineConfig::default().with_overrides(None, Some(0.5));
        assert_eq!(over.trim_epsilon, DEFAULT_TRIM_EPSILON);
        let at_cap = EngineConfig::default().with_overrides(None, Some(MAX_TRIM_EPSILON));
        assert_eq!(at_cap.trim_epsilon, MAX_TRIM_EPSILON);
        assert!(!is_usable_epsilon(f64::INFINITY));
    }
}
