use crate::config::ReconstructionConfig;
use crate::error::Result;
use crate::extraction::{extract_surface_points, ExtractedSurface, SamplingGrid};
use crate::gaussian_elimination::solve_gaussian_elimination;
use crate::implicit_function::{ImplicitFunction, ResidualReport};
use crate::kernel::assemble_system;
use crate::mesh::{SurfaceMesh, Triangulator};
use crate::point_set::PointSet;
use crate::Real;
use na::{DVector, Point3, Vector3};

/// An implicit surface reconstructed by global multiquadric RBF interpolation.
///
/// A reconstruction is fully determined by its point set and configuration. It owns the
/// point set and everything derived from it; reconstructing another point set requires a
/// new instance.
#[derive(Clone, Debug)]
pub struct RbfReconstruction {
    function: ImplicitFunction,
    config: ReconstructionConfig,
}

impl RbfReconstruction {
    /// Reconstructs the implicit function of `points` with the default configuration.
    pub fn new(points: PointSet) -> Result<Self> {
        Self::from_points(points, &ReconstructionConfig::default())
    }

    /// Reconstructs the implicit function interpolating `points`.
    ///
    /// This assembles the dense `n x n` kernel system, then solves it with Gaussian
    /// elimination. The solve is `O(n³)`, which limits practical inputs to a few thousand
    /// points.
    ///
    /// Fails with [`ReconstructionError::NumericalFailure`](crate::ReconstructionError::NumericalFailure)
    /// when the system is singular, typically because of duplicate points.
    pub fn from_points(points: PointSet, config: &ReconstructionConfig) -> Result<Self> {
        config.validate()?;
        let kernel = config.kernel()?;

        let system = assemble_system(points.points(), &kernel)?;
        let (matrix, constraints) = system.into_parts();
        let weights = solve_gaussian_elimination(matrix, constraints, config.pivot_epsilon)?;
        let function = ImplicitFunction::new(points, weights, kernel)?;

        log::info!(
            "reconstructed the implicit function of {} points (c = {})",
            function.points().len(),
            kernel.smoothing()
        );

        Ok(Self {
            function,
            config: *config,
        })
    }

    /// The reconstructed implicit function.
    pub fn function(&self) -> &ImplicitFunction {
        &self.function
    }

    /// The configuration this reconstruction was built with.
    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    /// The interpolated point set.
    pub fn points(&self) -> &PointSet {
        self.function.points()
    }

    /// The interpolation weights, one per point.
    pub fn weights(&self) -> &DVector<Real> {
        self.function.weights()
    }

    /// Evaluates the value of the implicit function at the given 3D point.
    pub fn eval(&self, pt: &Point3<Real>) -> Real {
        self.function.eval(pt)
    }

    /// Evaluates the value of the implicit function’s gradient at the given 3D point.
    pub fn eval_gradient(&self, pt: &Point3<Real>) -> Vector3<Real> {
        self.function.eval_gradient(pt)
    }

    /// Is `|f(pt)|` strictly below `threshold`?
    pub fn is_on_surface(&self, pt: &Point3<Real>, threshold: Real) -> bool {
        self.function.is_on_surface(pt, threshold)
    }

    /// Evaluates the function at every input point.
    pub fn residual_report(&self) -> ResidualReport {
        let report = self.function.residual_report();
        log::debug!(
            "interpolation residuals: total {:e}, max {:e}",
            report.total_abs_residual,
            report.max_abs_residual()
        );
        report
    }

    /// Samples `[-1, 1]³` every `step` and keeps the samples where `|f| < threshold`.
    pub fn extract_surface(&self, step: Real, threshold: Real) -> Result<ExtractedSurface> {
        let grid = SamplingGrid::new(step)?;
        extract_surface_points(&self.function, &grid, threshold)
    }

    /// Extracts the surface with the grid step and threshold of the configuration.
    pub fn extract_default_surface(&self) -> Result<ExtractedSurface> {
        self.extract_surface(self.config.grid_step, self.config.surface_threshold)
    }

    /// Extracts the surface with the configured parameters and triangulates it.
    pub fn reconstruct_mesh(&self, triangulator: &impl Triangulator) -> Result<SurfaceMesh> {
        let mesh = self.extract_default_surface()?.triangulate(triangulator)?;
        log::info!(
            "triangulated {} surface points into {} triangles",
            mesh.vertices().len(),
            mesh.triangles().len()
        );
        Ok(mesh)
    }
}
