//! Reduction strategies for long runs of small acceleration vectors.
//!
//! Floating-point addition is not associative, so the order in which a
//! million contributions are combined changes the last few bits of the
//! result. `Pairwise` keeps the rounding error at O(log n) and is the default.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use shell_core::vector::Vector3;
use thiserror::Error;

const PAIRWISE_BLOCK: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown summation strategy '{0}'")]
pub struct UnknownSummation(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Summation {
    /// Left-to-right from the zero vector.
    Sequential,
    /// Recursive halving down to small sequential blocks.
    #[default]
    Pairwise,
    /// Neumaier-compensated running sum per component.
    Compensated,
}

impl Summation {
    pub fn label(&self) -> &'static str {
        match self {
            Summation::Sequential => "sequential",
            Summation::Pairwise => "pairwise",
            Summation::Compensated => "compensated",
        }
    }

    pub fn sum(&self, values: &[Vector3]) -> Vector3 {
        match self {
            Summation::Sequential => sequential_sum(values),
            Summation::Pairwise => pairwise_sum(values),
            Summation::Compensated => compensated_sum(values),
        }
    }
}

impl fmt::Display for Summation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Summation {
    type Err = UnknownSummation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Summation::Sequential),
            "pairwise" => Ok(Summation::Pairwise),
            "compensated" | "kahan" => Ok(Summation::Compensated),
            _ => Err(UnknownSummation(s.to_string())),
        }
    }
}

pub fn sequential_sum(values: &[Vector3]) -> Vector3 {
    values.iter().sum()
}

pub fn pairwise_sum(values: &[Vector3]) -> Vector3 {
    if values.len() <= PAIRWISE_BLOCK {
        return sequential_sum(values);
    }
    let (left, right) = values.split_at(values.len() / 2);
    pairwise_sum(left) + pairwise_sum(right)
}

pub fn compensated_sum(values: &[Vector3]) -> Vector3 {
    let mut x = NeumaierSum::default();
    let mut y = NeumaierSum::default();
    let mut z = NeumaierSum::default();
    for v in values {
        x.push(v.x);
        y.push(v.y);
        z.push(v.z);
    }
    Vector3::new(x.value(), y.value(), z.value())
}

/// Scalar running sum with Neumaier's improvement on Kahan compensation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeumaierSum {
    sum: f64,
    compensation: f64,
}

impl NeumaierSum {
    pub fn push(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

impl FromIterator<f64> for NeumaierSum {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = NeumaierSum::default();
        for value in iter {
            acc.push(value);
        }
        acc
    }
}
