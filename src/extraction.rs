use crate::error::{ensure_positive, ReconstructionError, Result};
use crate::implicit_function::ImplicitFunction;
use crate::mesh::{SurfaceMesh, Triangulator};
use crate::Real;
use itertools::iproduct;
use na::Point3;
use parry::bounding_volume::Aabb;
use rayon::prelude::*;

/// A regular grid of sample points covering the normalized domain `[-1, 1]³`.
///
/// Coordinates are computed from integer indices (`-1 + k * step`, clamped to `1`) so the
/// sampled set never depends on floating-point accumulation. Both faces of the domain are
/// always sampled.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SamplingGrid {
    step: Real,
    samples_per_axis: usize,
    num_samples: usize,
}

impl SamplingGrid {
    /// A grid with the given spacing between consecutive samples along each axis.
    pub fn new(step: Real) -> Result<Self> {
        ensure_positive("grid step", step)?;

        let domain = Self::domain();
        let extent = domain.maxs.x - domain.mins.x;
        let num_intervals = extent / step;
        // Snap ratios like `2 / 0.1` to the integer they are meant to be.
        let snapped = num_intervals.round();
        let num_intervals = if (num_intervals - snapped).abs() <= 1.0e-9 * snapped.max(1.0) {
            snapped
        } else {
            num_intervals.ceil()
        };

        // `as usize` saturates, so the interval count is bounded before the cast.
        let too_fine = || {
            ReconstructionError::InvalidConfiguration(format!(
                "grid step {step:e} yields more samples than can be indexed"
            ))
        };
        if !num_intervals.is_finite() || num_intervals >= usize::MAX as Real {
            return Err(too_fine());
        }
        let samples_per_axis = (num_intervals as usize)
            .checked_add(1)
            .ok_or_else(too_fine)?;
        let num_samples = samples_per_axis.checked_pow(3).ok_or_else(too_fine)?;

        Ok(Self {
            step,
            samples_per_axis,
            num_samples,
        })
    }

    /// The sampled domain, `[-1, 1]` along each axis.
    pub fn domain() -> Aabb {
        Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
    }

    /// The spacing between consecutive samples.
    pub fn step(&self) -> Real {
        self.step
    }

    /// Number of samples along each axis.
    pub fn samples_per_axis(&self) -> usize {
        self.samples_per_axis
    }

    /// Total number of samples of the grid.
    pub fn len(&self) -> usize {
        self.num_samples
    }

    /// Always `false`: both faces of the domain are sampled.
    pub fn is_empty(&self) -> bool {
        self.samples_per_axis == 0
    }

    /// The coordinate of the `k`-th sample along any axis.
    pub fn coordinate(&self, k: usize) -> Real {
        let domain = Self::domain();
        (domain.mins.x + k as Real * self.step).min(domain.maxs.x)
    }

    /// The sample with integer coordinates `(i, j, k)`.
    pub fn point(&self, i: usize, j: usize, k: usize) -> Point3<Real> {
        Point3::new(self.coordinate(i), self.coordinate(j), self.coordinate(k))
    }

    /// All the samples, with `x` varying slowest and `z` fastest.
    pub fn points(&self) -> impl Iterator<Item = Point3<Real>> + '_ {
        let m = self.samples_per_axis;
        iproduct!(0..m, 0..m, 0..m).map(move |(i, j, k)| self.point(i, j, k))
    }
}

/// The grid samples retained by one extraction, in grid order.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedSurface {
    points: Vec<Point3<Real>>,
    grid: SamplingGrid,
    threshold: Real,
}

impl ExtractedSurface {
    /// The retained samples.
    pub fn points(&self) -> &[Point3<Real>] {
        &self.points
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Was no sample retained?
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The grid that was sampled.
    pub fn grid(&self) -> &SamplingGrid {
        &self.grid
    }

    /// The threshold the samples were filtered with.
    pub fn threshold(&self) -> Real {
        self.threshold
    }

    /// Number of samples the implicit function was evaluated at.
    pub fn samples_evaluated(&self) -> usize {
        self.grid.len()
    }

    /// Takes ownership of the retained samples.
    pub fn into_points(self) -> Vec<Point3<Real>> {
        self.points
    }

    /// Triangulates the retained samples.
    ///
    /// The points are moved into the resulting mesh, so its triangles always index the
    /// exact sequence the triangulator saw.
    pub fn triangulate(self, triangulator: &impl Triangulator) -> Result<SurfaceMesh> {
        let triangles = triangulator.triangulate(&self.points);
        SurfaceMesh::new(self.points, triangles)
    }
}

/// Retains the samples of `grid` where `|f| < threshold`.
///
/// `threshold` must be finite and positive. Samples are evaluated in parallel, one
/// `x`-slab per task, and the result keeps the sequential grid order.
pub fn extract_surface_points(
    function: &ImplicitFunction,
    grid: &SamplingGrid,
    threshold: Real,
) -> Result<ExtractedSurface> {
    ensure_positive("surface threshold", threshold)?;

    let m = grid.samples_per_axis();
    log::debug!(
        "sampling a {m}x{m}x{m} grid (step {}) against {} centers",
        grid.step(),
        function.points().len()
    );

    let points: Vec<_> = (0..m)
        .into_par_iter()
        .flat_map_iter(move |i| {
            iproduct!(0..m, 0..m)
                .map(move |(j, k)| grid.point(i, j, k))
                .filter(move |pt| function.is_on_surface(pt, threshold))
        })
        .collect();

    log::info!(
        "extracted {} surface points out of {} samples (threshold {threshold:e})",
        points.len(),
        grid.len()
    );

    Ok(ExtractedSurface {
        points,
        grid: *grid,
        threshold,
    })
}
