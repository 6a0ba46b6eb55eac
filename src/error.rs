use crate::Real;

/// Result type returned by every fallible operation of this crate.
pub type Result<T> = std::result::Result<T, ReconstructionError>;

/// Errors detected while building, solving, or sampling a reconstruction.
///
/// None of these are fatal: the library only reports them and the caller decides whether
/// to abort, retry with different inputs, or show a diagnostic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReconstructionError {
    /// The input data cannot be reconstructed (empty point set, non-finite coordinates,
    /// mismatched lengths).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A pivot of the Gaussian elimination is too small to divide by reliably.
    ///
    /// This is usually caused by duplicate or near-duplicate points. Retrying with
    /// [`PointSet::deduplicated`](crate::PointSet::deduplicated) or a larger smoothing
    /// constant generally fixes it.
    #[error(
        "numerical failure: pivot {pivot:e} at elimination step {step} is not above the tolerance {tolerance:e}"
    )]
    NumericalFailure {
        /// Index of the pivot column where elimination stopped.
        step: usize,
        /// Value of the selected pivot, after row swapping.
        pivot: Real,
        /// Absolute tolerance the pivot magnitude was compared against.
        tolerance: Real,
    },
    /// A grid step, threshold, smoothing constant, or tolerance is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A triangulator returned a triangle referencing a vertex it was never given.
    #[error(
        "triangle {triangle} references vertex {index} but only {num_vertices} vertices were triangulated"
    )]
    InvalidTriangulation {
        /// Position of the offending triangle in the triangulator output.
        triangle: usize,
        /// The out-of-range vertex index.
        index: u32,
        /// Number of vertices handed to the triangulator.
        num_vertices: usize,
    },
}

impl ReconstructionError {
    /// Can the same call succeed if retried with perturbed or deduplicated points, or a
    /// larger smoothing constant?
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NumericalFailure { .. })
    }
}

/// Rejects `value` unless it is finite and strictly positive.
pub(crate) fn ensure_positive(name: &str, value: Real) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ReconstructionError::InvalidConfiguration(format!(
            "{name} must be a finite positive number, got {value}"
        )))
    }
}

#[cfg(test)]
mod test {
    use super::{ensure_positive, ReconstructionError};

    #[test]
    fn only_numerical_failures_are_recoverable() {
        let failure = ReconstructionError::NumericalFailure {
            step: 1,
            pivot: 0.0,
            tolerance: 1.0e-12,
        };
        assert!(failure.is_recoverable());
        assert!(!ReconstructionError::InvalidInput("empty".to_string()).is_recoverable());
        assert!(!ReconstructionError::InvalidConfiguration("step".to_string()).is_recoverable());
    }

    #[test]
    fn positive_values_are_checked() {
        assert!(ensure_positive("step", 0.1).is_ok());
        assert!(ensure_positive("step", 0.0).is_err());
        assert!(ensure_positive("step", -1.0).is_err());
        assert!(ensure_positive("step", f64::NAN).is_err());
        assert!(ensure_positive("step", f64::INFINITY).is_err());
    }

    #[test]
    fn messages_name_the_failure() {
        let err = ReconstructionError::InvalidTriangulation {
            triangle: 3,
            index: 12,
            num_vertices: 10,
        };
        assert_eq!(
            err.to_string(),
            "triangle 3 references vertex 12 but only 10 vertices were triangulated"
        );
    }
}
