//! Repeated-trial statistics across increasing sample counts.

use rand::Rng;
use serde::Serialize;
use shell_core::vector::Vector3;

use crate::{
    AccumulateOptions, Accumulation, GravityError, ParameterError, ShellRequest,
    accumulate_gravity_from_points,
};

/// Summary of several independent accumulations at one sample count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierStatistics {
    pub numpoints: usize,
    pub trials: usize,
    pub mean_acceleration: Vector3,
    pub mean_magnitude: f64,
    /// Sample standard deviation of the magnitude; zero for a single trial.
    pub std_dev_magnitude: f64,
    pub standard_error: f64,
}

impl TierStatistics {
    /// Returns `None` for an empty slice.
    pub fn from_accumulations(runs: &[Accumulation]) -> Option<Self> {
        let first = runs.first()?;
        let trials = runs.len();
        let n = trials as f64;

        let mean_acceleration = runs.iter().map(|r| r.acceleration).sum::<Vector3>() * (1.0 / n);
        let magnitudes: Vec<f64> = runs.iter().map(Accumulation::magnitude).collect();
        let mean_magnitude = magnitudes.iter().sum::<f64>() / n;
        let std_dev_magnitude = if trials > 1 {
            let ss: f64 = magnitudes
                .iter()
                .map(|m| (m - mean_magnitude).powi(2))
                .sum();
            (ss / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        Some(Self {
            numpoints: first.numpoints,
            trials,
            mean_acceleration,
            mean_magnitude,
            std_dev_magnitude,
            standard_error: std_dev_magnitude / n.sqrt(),
        })
    }
}

/// Direction of the mean magnitude between the first and last tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Decreasing,
    Flat,
    Increasing,
}

/// Compare the first and last tier, treating differences within two combined
/// standard errors as `Flat`.
pub fn mean_magnitude_trend(tiers: &[TierStatistics]) -> Trend {
    let (Some(first), Some(last)) = (tiers.first(), tiers.last()) else {
        return Trend::Flat;
    };
    if tiers.len() < 2 {
        return Trend::Flat;
    }
    let diff = last.mean_magnitude - first.mean_magnitude;
    let band = 2.0 * (first.standard_error.powi(2) + last.standard_error.powi(2)).sqrt();
    if diff < -band {
        Trend::Decreasing
    } else if diff > band {
        Trend::Increasing
    } else {
        Trend::Flat
    }
}

/// Run `trials` accumulations for each entry of `tiers`, in order.
pub fn study<R: Rng + ?Sized>(
    request: &ShellRequest,
    tiers: &[usize],
    trials: usize,
    options: &AccumulateOptions,
    rng: &mut R,
) -> Result<Vec<TierStatistics>, GravityError> {
    if trials == 0 {
        return Err(ParameterError::ZeroTrials.into());
    }
    let mut out = Vec::with_capacity(tiers.len());
    for &numpoints in tiers {
        let tier_request = request.with_numpoints(numpoints);
        let runs = (0..trials)
            .map(|_| accumulate_gravity_from_points(&tier_request, options, rng))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(stats) = TierStatistics::from_accumulations(&runs) {
            out.push(stats);
        }
    }
    Ok(out)
}
