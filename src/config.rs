use crate::error::{ensure_positive, ReconstructionError, Result};
use crate::gaussian_elimination::DEFAULT_PIVOT_EPSILON;
use crate::kernel::Multiquadric;
use crate::Real;

/// Parameters of an [`RbfReconstruction`](crate::RbfReconstruction).
///
/// # Parameters
/// - `smoothing`: the multiquadric constant `c` of `sqrt(r² + c²)`. Larger values give a
///   smoother, better conditioned but less local interpolant.
/// - `pivot_epsilon`: relative tolerance of the Gaussian elimination. A pivot not above
///   `pivot_epsilon` times the largest matrix entry is reported as a numerical failure.
/// - `grid_step`: spacing of the extraction grid over `[-1, 1]³`.
/// - `surface_threshold`: grid samples with `|f| < surface_threshold` are extracted.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-serialize",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ReconstructionConfig {
    /// The multiquadric smoothing constant.
    pub smoothing: Real,
    /// The relative pivot tolerance of the solver.
    pub pivot_epsilon: Real,
    /// The extraction grid spacing.
    pub grid_step: Real,
    /// The extraction threshold.
    pub surface_threshold: Real,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            smoothing: Multiquadric::DEFAULT_SMOOTHING,
            pivot_epsilon: DEFAULT_PIVOT_EPSILON,
            grid_step: 0.05,
            surface_threshold: 0.01,
        }
    }
}

impl ReconstructionConfig {
    /// Sets the multiquadric smoothing constant.
    pub fn with_smoothing(mut self, smoothing: Real) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Sets the relative pivot tolerance.
    pub fn with_pivot_epsilon(mut self, pivot_epsilon: Real) -> Self {
        self.pivot_epsilon = pivot_epsilon;
        self
    }

    /// Sets the extraction grid spacing.
    pub fn with_grid_step(mut self, grid_step: Real) -> Self {
        self.grid_step = grid_step;
        self
    }

    /// Sets the extraction threshold.
    pub fn with_surface_threshold(mut self, surface_threshold: Real) -> Self {
        self.surface_threshold = surface_threshold;
        self
    }

    /// Checks that every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("smoothing constant", self.smoothing)?;
        ensure_positive("grid step", self.grid_step)?;
        ensure_positive("surface threshold", self.surface_threshold)?;

        if !(self.pivot_epsilon.is_finite() && self.pivot_epsilon >= 0.0) {
            return Err(ReconstructionError::InvalidConfiguration(format!(
                "pivot epsilon must be a finite non-negative number, got {}",
                self.pivot_epsilon
            )));
        }

        Ok(())
    }

    /// The kernel described by this configuration.
    pub fn kernel(&self) -> Result<Multiquadric> {
        Multiquadric::new(self.smoothing)
    }
}
