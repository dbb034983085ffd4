//! Monte Carlo estimate of the gravitational acceleration inside a hollow shell.
//!
//! The shell's mass is split evenly over `numpoints` random surface samples,
//! each sample is treated as a point mass, and the Newtonian contributions at
//! the observer are summed. For an observer strictly inside the shell the
//! estimate trends toward zero as the sample count grows.

pub mod convergence;
pub mod summation;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use shell_core::constants::G;
use shell_core::vector::{self, DegenerateVectorError, Point3, Vector3};
use shell_sampler::{SamplerError, SamplingMethod, Sphere};
use thiserror::Error;
use tracing::debug;

pub use summation::Summation;

/// Inputs that are rejected before any sampling happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("shell radius must be finite and positive (got {0})")]
    Radius(f64),
    #[error("sample count must be at least 1")]
    ZeroSamples,
    #[error("total mass must be finite (got {0})")]
    Mass(f64),
    #[error("observer location {0} is not finite")]
    Location(Point3),
    #[error("chunk size must be at least 1")]
    ZeroChunkSize,
    #[error("trial count must be at least 1")]
    ZeroTrials,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GravityError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),
    #[error("{}", describe_degenerate(.observer, .source))]
    DegenerateGeometry {
        observer: Point3,
        #[source]
        source: DegenerateVectorError,
    },
    #[error("sampling failed: {0}")]
    Sampler(#[from] SamplerError),
}

fn describe_degenerate(observer: &Point3, source: &DegenerateVectorError) -> String {
    if source.vector == Vector3::ZERO {
        format!("observer at {observer} coincides with source point")
    } else {
        format!(
            "offset {} from observer at {observer} has no usable length ({})",
            source.vector, source.length
        )
    }
}

/// Shell geometry, observer, and sample count for one accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShellRequest {
    pub radius: f64,
    pub location: Point3,
    pub numpoints: usize,
    pub total_mass: f64,
}

impl ShellRequest {
    /// Observer on the shell's north pole, `(0, radius, 0)`.
    pub fn north_pole(radius: f64, numpoints: usize, total_mass: f64) -> Self {
        Self {
            radius,
            location: Point3::new(0.0, radius, 0.0),
            numpoints,
            total_mass,
        }
    }

    pub fn with_numpoints(self, numpoints: usize) -> Self {
        Self { numpoints, ..self }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ParameterError::Radius(self.radius));
        }
        if self.numpoints == 0 {
            return Err(ParameterError::ZeroSamples);
        }
        if !self.total_mass.is_finite() {
            return Err(ParameterError::Mass(self.total_mass));
        }
        if !self.location.is_finite() {
            return Err(ParameterError::Location(self.location));
        }
        Ok(())
    }

    /// Mass carried by each sampled point.
    pub fn point_mass(&self) -> f64 {
        self.total_mass / self.numpoints as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccumulateOptions {
    pub method: SamplingMethod,
    pub summation: Summation,
}

/// Result of one Monte Carlo accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Accumulation {
    pub acceleration: Vector3,
    pub numpoints: usize,
    pub point_mass: f64,
    /// Sum of the per-point masses actually used; matches the requested
    /// total mass up to rounding.
    pub distributed_mass: f64,
}

impl Accumulation {
    pub fn magnitude(&self) -> f64 {
        self.acceleration.length()
    }
}

/// Acceleration at `loc` due to a point mass `mass` located at `p`.
///
/// Returns a vector pointing from `loc` toward `p` with magnitude
/// `G * mass / dist²`. Fails when the two locations coincide.
pub fn acceleration_from_point(
    loc: &Point3,
    p: &Point3,
    mass: f64,
) -> Result<Vector3, GravityError> {
    let offset = vector::displacement(loc, p);
    let direction = offset
        .normalize()
        .map_err(|source| GravityError::DegenerateGeometry {
            observer: *loc,
            source,
        })?;
    let accel_mag = G * mass / offset.length_squared();
    Ok(direction.scale(accel_mag))
}

/// Estimate the acceleration at `request.location` from `request.numpoints`
/// random points on the shell, drawing every sample from `rng`.
pub fn accumulate_gravity_from_points<R: Rng + ?Sized>(
    request: &ShellRequest,
    options: &AccumulateOptions,
    rng: &mut R,
) -> Result<Accumulation, GravityError> {
    request.validate()?;
    let sphere = Sphere::new(request.radius)?;
    let point_mass = request.point_mass();

    let (acceleration, distributed_mass) =
        accumulate_chunk(&sphere, request, options, point_mass, request.numpoints, rng)?;

    debug!(
        numpoints = request.numpoints,
        method = %options.method,
        summation = %options.summation,
        magnitude = acceleration.length(),
        "accumulated shell gravity"
    );

    Ok(Accumulation {
        acceleration,
        numpoints: request.numpoints,
        point_mass,
        distributed_mass,
    })
}

/// Parallel variant of [`accumulate_gravity_from_points`].
///
/// Samples are split into chunks of `chunk_size`; chunk `i` draws from its
/// own generator derived from `(seed, i)`, so the result depends only on the
/// seed and chunk size, never on the thread count. Chunk partial sums are
/// reduced in chunk order with the requested summation strategy.
pub fn accumulate_gravity_parallel(
    request: &ShellRequest,
    options: &AccumulateOptions,
    seed: u64,
    chunk_size: usize,
) -> Result<Accumulation, GravityError> {
    request.validate()?;
    if chunk_size == 0 {
        return Err(ParameterError::ZeroChunkSize.into());
    }
    let sphere = Sphere::new(request.radius)?;
    let point_mass = request.point_mass();
    let chunks = request.numpoints.div_ceil(chunk_size);

    let partials = (0..chunks)
        .into_par_iter()
        .map(|index| {
            let start = index * chunk_size;
            let count = chunk_size.min(request.numpoints - start);
            let mut rng = chunk_rng(seed, index);
            accumulate_chunk(&sphere, request, options, point_mass, count, &mut rng)
        })
        .collect::<Result<Vec<_>, GravityError>>()?;

    let vectors: Vec<Vector3> = partials.iter().map(|(v, _)| *v).collect();
    let acceleration = options.summation.sum(&vectors);
    let distributed_mass = partials
        .iter()
        .map(|(_, m)| *m)
        .collect::<summation::NeumaierSum>()
        .value();

    debug!(
        numpoints = request.numpoints,
        chunks,
        chunk_size,
        method = %options.method,
        summation = %options.summation,
        magnitude = acceleration.length(),
        "accumulated shell gravity in parallel"
    );

    Ok(Accumulation {
        acceleration,
        numpoints: request.numpoints,
        point_mass,
        distributed_mass,
    })
}

fn accumulate_chunk<R: Rng + ?Sized>(
    sphere: &Sphere,
    request: &ShellRequest,
    options: &AccumulateOptions,
    point_mass: f64,
    count: usize,
    rng: &mut R,
) -> Result<(Vector3, f64), GravityError> {
    let mut mass = summation::NeumaierSum::default();
    let contributions = sphere
        .points(options.method, rng)
        .take(count)
        .map(|p| {
            mass.push(point_mass);
            acceleration_from_point(&request.location, &p, point_mass)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((options.summation.sum(&contributions), mass.value()))
}

fn chunk_rng(seed: u64, index: usize) -> StdRng {
    // golden-ratio stride between chunk seeds
    StdRng::seed_from_u64(seed.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)))
}
