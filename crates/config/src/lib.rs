//! Experiment configuration models and loaders for the shell theorem calculator.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sample-count tiers of the reference experiment.
pub const DEFAULT_TIERS: [usize; 4] = [1_000, 10_000, 100_000, 1_000_000];
pub const DEFAULT_RADIUS_M: f64 = 1.0;
pub const DEFAULT_MASS_KG: f64 = 1.0e9;
pub const DEFAULT_CHUNK_SIZE: usize = 65_536;

/// Full description of one convergence experiment.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Sample counts to run, in order.
    pub tiers: Vec<usize>,
    /// Independent repetitions per tier.
    pub trials: usize,
    pub shell: ShellConfig,
    pub sampling: SamplingConfig,
}

/// Shell geometry and the observer position.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    pub radius_m: f64,
    pub mass_kg: f64,
    /// Defaults to the north pole `(0, radius, 0)` when omitted.
    pub observer_m: Option<[f64; 3]>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingConfig {
    pub method: SamplingMethodConfig,
    pub summation: SummationConfig,
    pub parallel: bool,
    pub chunk_size: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMethodConfig {
    #[default]
    Archimedes,
    Marsaglia,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummationConfig {
    Sequential,
    #[default]
    Pairwise,
    Compensated,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_TIERS.to_vec(),
            trials: 1,
            shell: ShellConfig::default(),
            sampling: SamplingConfig::default(),
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_RADIUS_M,
            mass_kg: DEFAULT_MASS_KG,
            observer_m: None,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            method: SamplingMethodConfig::default(),
            summation: SummationConfig::default(),
            parallel: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            seed: None,
        }
    }
}

impl ShellConfig {
    /// Observer position, falling back to the north pole of the shell.
    pub fn observer(&self) -> [f64; 3] {
        self.observer_m.unwrap_or([0.0, self.radius_m, 0.0])
    }
}

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ExperimentConfig {
    /// Reject parameters the accumulator would refuse, before any tier runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: String| Err(ConfigError::Invalid { field, reason });

        let radius = self.shell.radius_m;
        if !radius.is_finite() || radius <= 0.0 {
            return invalid("shell.radius_m", format!("must be finite and positive, got {radius}"));
        }
        if !self.shell.mass_kg.is_finite() {
            return invalid("shell.mass_kg", format!("must be finite, got {}", self.shell.mass_kg));
        }
        if self.shell.observer().iter().any(|c| !c.is_finite()) {
            return invalid("shell.observer_m", "components must be finite".to_string());
        }
        if self.tiers.is_empty() {
            return invalid("tiers", "at least one tier is required".to_string());
        }
        if self.tiers.contains(&0) {
            return invalid("tiers", "sample counts must be at least 1".to_string());
        }
        if self.trials == 0 {
            return invalid("trials", "must be at least 1".to_string());
        }
        if self.sampling.chunk_size == 0 {
            return invalid("sampling.chunk_size", "must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Load and validate an experiment from a `.toml` file, or YAML otherwise.
pub fn load_experiment<P: AsRef<Path>>(path: P) -> Result<ExperimentConfig, ConfigError> {
    let config: ExperimentConfig = load_record(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse an experiment from TOML text.
pub fn experiment_from_toml(contents: &str) -> Result<ExperimentConfig, ConfigError> {
    let config: ExperimentConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Parse an experiment from YAML text.
pub fn experiment_from_yaml(contents: &str) -> Result<ExperimentConfig, ConfigError> {
    let config: ExperimentConfig = serde_yaml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

fn load_record<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}
