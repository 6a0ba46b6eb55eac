use crate::error::{ensure_positive, ReconstructionError, Result};
use crate::Real;
use na::{DMatrix, DVector, Point3};
use rayon::prelude::*;

/// The multiquadric radial basis function `sqrt(r² + c²)`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-serialize",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Multiquadric {
    smoothing: Real,
}

impl Default for Multiquadric {
    fn default() -> Self {
        Self {
            smoothing: Self::DEFAULT_SMOOTHING,
        }
    }
}

impl Multiquadric {
    /// The smoothing constant `c` used when none is specified.
    pub const DEFAULT_SMOOTHING: Real = 0.1;

    /// A multiquadric kernel with the smoothing constant `c`.
    ///
    /// `c` must be finite and positive so that `kernel(0) = c` never vanishes.
    pub fn new(smoothing: Real) -> Result<Self> {
        ensure_positive("smoothing constant", smoothing)?;
        Ok(Self { smoothing })
    }

    /// The smoothing constant `c`.
    pub fn smoothing(&self) -> Real {
        self.smoothing
    }

    /// Evaluates the kernel at the distance `r`.
    #[inline]
    pub fn eval(&self, r: Real) -> Real {
        (r * r + self.smoothing * self.smoothing).sqrt()
    }

    /// Evaluates the kernel at the Euclidean distance between `a` and `b`.
    #[inline]
    pub fn eval_between(&self, a: &Point3<Real>, b: &Point3<Real>) -> Real {
        self.eval(na::distance(a, b))
    }
}

/// The dense interpolation system `A λ = y` built from a point set.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelSystem {
    /// `A[i][j] = kernel(|p_i - p_j|)`.
    pub matrix: DMatrix<Real>,
    /// The right-hand side: zero everywhere since every sample lies on the surface.
    pub constraints: DVector<Real>,
}

impl KernelSystem {
    /// Dimension of the system, i.e., the number of points it was built from.
    pub fn dim(&self) -> usize {
        self.constraints.len()
    }

    /// Splits the system into its matrix and its right-hand side.
    pub fn into_parts(self) -> (DMatrix<Real>, DVector<Real>) {
        (self.matrix, self.constraints)
    }
}

/// Assembles the kernel matrix and the (zero) constraint vector for `points`.
///
/// Each entry is computed independently so the columns are filled in parallel. An empty
/// slice is rejected with [`ReconstructionError::InvalidInput`].
pub fn assemble_system(points: &[Point3<Real>], kernel: &Multiquadric) -> Result<KernelSystem> {
    let n = points.len();

    if n == 0 {
        return Err(ReconstructionError::InvalidInput(
            "cannot assemble a kernel system from an empty point set".to_string(),
        ));
    }

    log::debug!("assembling a {n}x{n} multiquadric system");

    let mut matrix = DMatrix::zeros(n, n);

    // The storage is column-major: chunk `j` is column `j`.
    matrix
        .as_mut_slice()
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(j, column)| {
            let pj = &points[j];
            for (entry, pi) in column.iter_mut().zip(points.iter()) {
                *entry = kernel.eval_between(pi, pj);
            }
        });

    Ok(KernelSystem {
        matrix,
        constraints: DVector::zeros(n),
    })
}
