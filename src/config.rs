// Config - Simulator settings from defaults, .env and the environment

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{SimError, SimResult};
use crate::physics_engine::IntegratorConfig;

pub const ENV_STORAGE_ROOT: &str = "ORRERY_STORAGE_ROOT";
pub const ENV_TIME_STEP: &str = "ORRERY_TIME_STEP";
pub const ENV_GRAVITATIONAL_CONSTANT: &str = "ORRERY_GRAVITATIONAL_CONSTANT";
pub const ENV_MAX_TRAJECTORY_SAMPLES: &str = "ORRERY_MAX_TRAJECTORY_SAMPLES";
pub const ENV_MAX_INTEGRATION_STEPS: &str = "ORRERY_MAX_INTEGRATION_STEPS";

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Directory holding one sub-directory per saved simulation
    pub storage_root: PathBuf,
    /// Engine settings for newly created simulations
    pub integrator: IntegratorConfig,
    /// Upper bound on samples a single trajectory request may produce
    pub max_trajectory_samples: usize,
    /// Upper bound on engine steps a single integrate, prediction or
    /// trajectory request may run
    pub max_integration_steps: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("simulations"),
            integrator: IntegratorConfig::default(),
            max_trajectory_samples: 100_000,
            max_integration_steps: 1_000_000,
        }
    }
}

impl SimulatorConfig {
    /// Defaults overridden by `ORRERY_*` variables; a `.env` file in the
    /// working directory is loaded first if present.
    pub fn from_env() -> SimResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> SimResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(root) = lookup(ENV_STORAGE_ROOT) {
            if root.trim().is_empty() {
                return Err(invalid(ENV_STORAGE_ROOT, &root));
            }
            config.storage_root = PathBuf::from(root);
        }
        if let Some(dt) = parse_finite(&lookup, ENV_TIME_STEP)? {
            config.integrator.dt = dt;
        }
        if let Some(g) = parse_finite(&lookup, ENV_GRAVITATIONAL_CONSTANT)? {
            config.integrator.gravitational_constant = g;
        }
        if let Some(max) = parse_positive::<usize>(&lookup, ENV_MAX_TRAJECTORY_SAMPLES)? {
            config.max_trajectory_samples = max;
        }
        if let Some(max) = parse_positive::<u64>(&lookup, ENV_MAX_INTEGRATION_STEPS)? {
            config.max_integration_steps = max;
        }

        Ok(config)
    }
}

fn parse_positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> SimResult<Option<T>>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(Some(value)),
        _ => Err(invalid(key, &raw)),
    }
}

fn parse_finite(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> SimResult<Option<f64>> {
    match parse_positive::<f64>(lookup, key)? {
        Some(value) if !value.is_finite() => Err(invalid(key, &value.to_string())),
        other => Ok(other),
    }
}

fn invalid(key: &str, value: &str) -> SimError {
    SimError::Config {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = SimulatorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SimulatorConfig::default());
        assert_eq!(config.storage_root, PathBuf::from("simulations"));
        assert_eq!(config.integrator.dt, 3600.0);
    }

    #[test]
    fn test_overrides_applied() {
        let config = SimulatorConfig::from_lookup(lookup(&[
            (ENV_STORAGE_ROOT, "/tmp/sims"),
            (ENV_TIME_STEP, " 60 "),
            (ENV_GRAVITATIONAL_CONSTANT, "1.0"),
            (ENV_MAX_TRAJECTORY_SAMPLES, "500"),
            (ENV_MAX_INTEGRATION_STEPS, "2000"),
        ]))
        .unwrap();

        assert_eq!(config.storage_root, PathBuf::from("/tmp/sims"));
        assert_eq!(config.integrator.dt, 60.0);
        assert_eq!(config.integrator.gravitational_constant, 1.0);
        assert_eq!(config.max_trajectory_samples, 500);
        assert_eq!(config.max_integration_steps, 2000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (key, value) in [
            (ENV_TIME_STEP, "fast"),
            (ENV_TIME_STEP, "-1"),
            (ENV_TIME_STEP, "inf"),
            (ENV_GRAVITATIONAL_CONSTANT, "0"),
            (ENV_MAX_TRAJECTORY_SAMPLES, "0"),
            (ENV_MAX_INTEGRATION_STEPS, "-5"),
            (ENV_STORAGE_ROOT, "  "),
        ] {
            let err = SimulatorConfig::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(
                matches!(err, SimError::Config { key: ref k, .. } if k == key),
                "{key}={value}"
            );
        }
    }
}
