use crate::error::{ReconstructionError, Result};
use crate::kernel::Multiquadric;
use crate::point_set::PointSet;
use crate::Real;
use na::{DVector, Point3, Vector3};
use rayon::prelude::*;
use std::fmt;

/// The implicit function `f(p) = Σ λ_i kernel(|p - p_i|)` interpolating a point set.
///
/// The reconstructed surface is the zero level-set of `f`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImplicitFunction {
    points: PointSet,
    weights: DVector<Real>,
    kernel: Multiquadric,
}

impl ImplicitFunction {
    /// Combines solved weights with the point set they were solved for.
    ///
    /// The `i`-th weight multiplies the kernel centered on the `i`-th point, so both must
    /// have the same length.
    pub fn new(points: PointSet, weights: DVector<Real>, kernel: Multiquadric) -> Result<Self> {
        if weights.len() != points.len() {
            return Err(ReconstructionError::InvalidInput(format!(
                "expected one weight per point ({} points, {} weights)",
                points.len(),
                weights.len()
            )));
        }

        if weights.iter().any(|w| !w.is_finite()) {
            return Err(ReconstructionError::InvalidInput(
                "interpolation weights must be finite".to_string(),
            ));
        }

        Ok(Self {
            points,
            weights,
            kernel,
        })
    }

    /// The interpolated points (the RBF centers).
    pub fn points(&self) -> &PointSet {
        &self.points
    }

    /// The interpolation weights, one per point.
    pub fn weights(&self) -> &DVector<Real> {
        &self.weights
    }

    /// The radial basis function.
    pub fn kernel(&self) -> &Multiquadric {
        &self.kernel
    }

    /// Evaluates the value of the implicit function at the given 3D point.
    pub fn eval(&self, pt: &Point3<Real>) -> Real {
        let mut result = 0.0;

        for (center, weight) in self.points.points().iter().zip(self.weights.iter()) {
            result += *weight * self.kernel.eval_between(pt, center);
        }

        result
    }

    /// Evaluates the value of the implicit function’s gradient at the given 3D point.
    pub fn eval_gradient(&self, pt: &Point3<Real>) -> Vector3<Real> {
        let mut result = Vector3::zeros();

        for (center, weight) in self.points.points().iter().zip(self.weights.iter()) {
            let dpt = pt - center;
            // The kernel is never smaller than the smoothing constant.
            result += dpt * (*weight / self.kernel.eval(dpt.norm()));
        }

        result
    }

    /// Is `|f(pt)|` strictly below `threshold`?
    pub fn is_on_surface(&self, pt: &Point3<Real>, threshold: Real) -> bool {
        self.eval(pt).abs() < threshold
    }

    /// Evaluates the function at every interpolated point.
    ///
    /// Exact interpolation would give zero everywhere; in floating point the values are
    /// only expected to be small.
    pub fn residual_report(&self) -> ResidualReport {
        let entries: Vec<_> = self
            .points
            .points()
            .par_iter()
            .map(|pt| ResidualEntry {
                point: *pt,
                value: self.eval(pt),
            })
            .collect();
        let total_abs_residual = entries.iter().map(|e| e.value.abs()).sum();

        ResidualReport {
            entries,
            total_abs_residual,
        }
    }
}

/// The value of the implicit function at one interpolated point.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-serialize",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ResidualEntry {
    /// The interpolated point.
    pub point: Point3<Real>,
    /// `f(point)`, ideally zero.
    pub value: Real,
}

/// Interpolation residuals at every input point, in input order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-serialize",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ResidualReport {
    /// One entry per input point.
    pub entries: Vec<ResidualEntry>,
    /// `Σ |f(p_i)|`.
    pub total_abs_residual: Real,
}

impl ResidualReport {
    /// The residual values, in input order.
    pub fn values(&self) -> impl Iterator<Item = Real> + '_ {
        self.entries.iter().map(|e| e.value)
    }

    /// The largest `|f(p_i)|`.
    pub fn max_abs_residual(&self) -> Real {
        self.values().fold(0.0, |acc, v| acc.max(v.abs()))
    }
}

impl fmt::Display for ResidualReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(
                f,
                "f({}, {}, {}) = {:e}",
                entry.point.x, entry.point.y, entry.point.z, entry.value
            )?;
        }
        write!(f, "Total error: {:e}", self.total_abs_residual)
    }
}
