//! Experiment runner: turns an [`ExperimentConfig`] into accumulator calls,
//! one tier at a time, and collects the results into a report.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use shell_config::{ConfigError, ExperimentConfig, SamplingMethodConfig, SummationConfig};
use shell_core::vector::{Point3, Vector3};
use shell_export::csv::TierRecord;
use shell_gravity::convergence::{self, TierStatistics, Trend};
use shell_gravity::{
    AccumulateOptions, Accumulation, GravityError, ShellRequest, Summation,
    accumulate_gravity_from_points, accumulate_gravity_parallel,
};
use shell_sampler::SamplingMethod;
use thiserror::Error;
use tracing::{info, warn};

/// Relative band around the radius treated as "on the shell".
const ON_SHELL_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("accumulation failed: {0}")]
    Gravity(#[from] GravityError),
}

/// Outcome of one sample-count tier.
#[derive(Debug, Clone, Serialize)]
pub struct TierReport {
    pub numpoints: usize,
    /// Acceleration from the first trial.
    pub acceleration: Vector3,
    pub magnitude: f64,
    pub point_mass_kg: f64,
    pub distributed_mass_kg: f64,
    pub statistics: TierStatistics,
}

impl TierReport {
    pub fn to_record(&self) -> TierRecord {
        TierRecord {
            numpoints: self.numpoints,
            trials: self.statistics.trials,
            acceleration: self.acceleration.to_array(),
            magnitude: self.magnitude,
            mean_magnitude: self.statistics.mean_magnitude,
            std_dev_magnitude: self.statistics.std_dev_magnitude,
            point_mass_kg: self.point_mass_kg,
            distributed_mass_kg: self.distributed_mass_kg,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub radius_m: f64,
    pub mass_kg: f64,
    pub observer_m: Point3,
    pub method: &'static str,
    pub summation: &'static str,
    pub parallel: bool,
    pub seed: u64,
    pub trials: usize,
    pub tiers: Vec<TierReport>,
    pub trend: Trend,
}

/// A validated experiment ready to run.
#[derive(Debug, Clone)]
pub struct Experiment {
    config: ExperimentConfig,
    base: ShellRequest,
    options: AccumulateOptions,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> Result<Self, ExperimentError> {
        config.validate()?;
        let observer = Point3::from(config.shell.observer());
        let base = ShellRequest {
            radius: config.shell.radius_m,
            location: observer,
            numpoints: config.tiers[0],
            total_mass: config.shell.mass_kg,
        };
        let options = AccumulateOptions {
            method: sampling_method(config.sampling.method),
            summation: summation(config.sampling.summation),
        };

        let radius = config.shell.radius_m;
        let distance = observer.length();
        if distance > radius * (1.0 + ON_SHELL_TOLERANCE) {
            warn!(
                observer = %observer,
                radius,
                "observer lies outside the shell; the estimate will not settle at zero"
            );
        } else if distance >= radius * (1.0 - ON_SHELL_TOLERANCE) {
            info!(
                observer = %observer,
                radius,
                "observer sits on the shell; expect heavy-tailed estimates"
            );
        }

        Ok(Self {
            config,
            base,
            options,
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn tiers(&self) -> &[usize] {
        &self.config.tiers
    }

    pub fn options(&self) -> &AccumulateOptions {
        &self.options
    }

    /// Run every trial for one tier. In parallel mode each trial draws a
    /// fresh chunk seed from `rng`, so the run stays reproducible.
    pub fn run_tier<R: Rng + ?Sized>(
        &self,
        numpoints: usize,
        rng: &mut R,
    ) -> Result<TierReport, ExperimentError> {
        let request = self.base.with_numpoints(numpoints);
        let sampling = &self.config.sampling;
        let runs = (0..self.config.trials)
            .map(|_| {
                if sampling.parallel {
                    accumulate_gravity_parallel(
                        &request,
                        &self.options,
                        rng.r#gen::<u64>(),
                        sampling.chunk_size,
                    )
                } else {
                    accumulate_gravity_from_points(&request, &self.options, rng)
                }
            })
            .collect::<Result<Vec<Accumulation>, GravityError>>()?;

        let first = runs[0];
        let statistics = TierStatistics::from_accumulations(&runs)
            .ok_or(shell_gravity::ParameterError::ZeroTrials)
            .map_err(GravityError::from)?;

        info!(
            numpoints,
            trials = statistics.trials,
            magnitude = first.magnitude(),
            mean_magnitude = statistics.mean_magnitude,
            std_dev = statistics.std_dev_magnitude,
            "tier complete"
        );

        Ok(TierReport {
            numpoints,
            acceleration: first.acceleration,
            magnitude: first.magnitude(),
            point_mass_kg: first.point_mass,
            distributed_mass_kg: first.distributed_mass,
            statistics,
        })
    }

    /// Run all tiers in order, stopping at the first failure.
    pub fn run<R: Rng + ?Sized>(
        &self,
        seed: u64,
        rng: &mut R,
    ) -> Result<ExperimentReport, ExperimentError> {
        let tiers = self
            .tiers()
            .iter()
            .map(|&n| self.run_tier(n, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.report(seed, tiers))
    }

    /// Assemble a report from tiers that have already run.
    pub fn report(&self, seed: u64, tiers: Vec<TierReport>) -> ExperimentReport {
        let stats: Vec<TierStatistics> = tiers.iter().map(|t| t.statistics.clone()).collect();
        ExperimentReport {
            generated_at: None,
            radius_m: self.base.radius,
            mass_kg: self.base.total_mass,
            observer_m: self.base.location,
            method: self.options.method.label(),
            summation: self.options.summation.label(),
            parallel: self.config.sampling.parallel,
            seed,
            trials: self.config.trials,
            tiers,
            trend: convergence::mean_magnitude_trend(&stats),
        }
    }
}

/// Master generator for a run. Without an explicit seed one is drawn from
/// OS entropy and returned so the run can be repeated.
pub fn seeded_rng(seed: Option<u64>) -> (StdRng, u64) {
    let seed = seed.unwrap_or_else(rand::random);
    (StdRng::seed_from_u64(seed), seed)
}

pub fn sampling_method(config: SamplingMethodConfig) -> SamplingMethod {
    match config {
        SamplingMethodConfig::Archimedes => SamplingMethod::Archimedes,
        SamplingMethodConfig::Marsaglia => SamplingMethod::Marsaglia,
    }
}

pub fn summation(config: SummationConfig) -> Summation {
    match config {
        SummationConfig::Sequential => Summation::Sequential,
        SummationConfig::Pairwise => Summation::Pairwise,
        SummationConfig::Compensated => Summation::Compensated,
    }
}
