//! Uniform random points on the surface of an origin-centred sphere.
//!
//! Every sampler draws from a caller-supplied [`rand::Rng`], so runs can be
//! reproduced by seeding the generator.

use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use shell_core::vector::Point3;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerError {
    #[error("sphere radius must be finite and positive (got {0})")]
    InvalidRadius(f64),
    #[error("unknown sampling method '{0}'")]
    UnknownMethod(String),
}

/// Strategy used to place a point uniformly on the sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingMethod {
    /// Uniform height along the polar (y) axis, uniform azimuth, then the
    /// horizontal components are scaled by the latitude-circle radius.
    /// Archimedes' hat-box theorem makes this area-uniform.
    #[default]
    Archimedes,
    /// Marsaglia (1972) rejection method on the unit disc.
    Marsaglia,
}

impl SamplingMethod {
    pub fn label(&self) -> &'static str {
        match self {
            SamplingMethod::Archimedes => "archimedes",
            SamplingMethod::Marsaglia => "marsaglia",
        }
    }
}

impl fmt::Display for SamplingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SamplingMethod {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "archimedes" => Ok(SamplingMethod::Archimedes),
            "marsaglia" => Ok(SamplingMethod::Marsaglia),
            _ => Err(SamplerError::UnknownMethod(s.to_string())),
        }
    }
}

/// A validated sphere centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    radius: f64,
}

impl Sphere {
    pub fn new(radius: f64) -> Result<Self, SamplerError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SamplerError::InvalidRadius(radius));
        }
        Ok(Self { radius })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Draw one point on the surface.
    pub fn sample<R: Rng + ?Sized>(&self, method: SamplingMethod, rng: &mut R) -> Point3 {
        match method {
            SamplingMethod::Archimedes => archimedes(self.radius, rng),
            SamplingMethod::Marsaglia => marsaglia(self.radius, rng),
        }
    }

    /// Lazily draw points on the surface; the iterator never ends.
    pub fn points<'a, R: Rng + ?Sized>(
        &'a self,
        method: SamplingMethod,
        rng: &'a mut R,
    ) -> impl Iterator<Item = Point3> + 'a {
        std::iter::repeat_with(move || self.sample(method, rng))
    }
}

/// Return a random point on the surface of a sphere of radius `radius`.
pub fn random_point_on_sphere<R: Rng + ?Sized>(
    radius: f64,
    method: SamplingMethod,
    rng: &mut R,
) -> Result<Point3, SamplerError> {
    Ok(Sphere::new(radius)?.sample(method, rng))
}

/// Draw `count` independent points on a sphere of radius `radius`.
pub fn sample_points<R: Rng + ?Sized>(
    count: usize,
    radius: f64,
    method: SamplingMethod,
    rng: &mut R,
) -> Result<Vec<Point3>, SamplerError> {
    let sphere = Sphere::new(radius)?;
    Ok(sphere.points(method, rng).take(count).collect())
}

fn archimedes<R: Rng + ?Sized>(r: f64, rng: &mut R) -> Point3 {
    // work on the unit sphere so r² never under- or overflows
    let height: f64 = rng.gen_range(-1.0..=1.0);
    let theta = rng.gen_range(0.0..TAU);
    let ring = (1.0 - height * height).max(0.0).sqrt();
    Point3::new(r * ring * theta.sin(), r * height, r * ring * theta.cos())
}

fn marsaglia<R: Rng + ?Sized>(r: f64, rng: &mut R) -> Point3 {
    loop {
        let u: f64 = rng.gen_range(-1.0..1.0);
        let v: f64 = rng.gen_range(-1.0..1.0);
        let s = u * u + v * v;
        if s > 0.0 && s < 1.0 {
            let k = 2.0 * (1.0 - s).sqrt();
            return Point3::new(r * u * k, r * v * k, r * (1.0 - 2.0 * s));
        }
    }
}
