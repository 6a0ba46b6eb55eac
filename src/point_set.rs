use crate::error::{ensure_positive, ReconstructionError, Result};
use crate::hgrid::HGrid;
use crate::Real;
use na::{Point3, Vector3};

/// An ordered, non-empty, immutable set of sample points.
///
/// The position of a point in this sequence is its row/column in the system matrix and its
/// entry in the weight vector. Normals, when present, are carried along unchanged but are
/// never read by the reconstruction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-serialize",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PointSet {
    points: Vec<Point3<Real>>,
    normals: Option<Vec<Vector3<Real>>>,
}

impl PointSet {
    /// Builds a point set from positions only.
    ///
    /// Fails with [`ReconstructionError::InvalidInput`] if `points` is empty or if any
    /// coordinate is not finite.
    pub fn new(points: Vec<Point3<Real>>) -> Result<Self> {
        Self::validate_points(&points)?;
        Ok(Self {
            points,
            normals: None,
        })
    }

    /// Builds a point set carrying one normal per point.
    pub fn with_normals(points: Vec<Point3<Real>>, normals: Vec<Vector3<Real>>) -> Result<Self> {
        Self::validate_points(&points)?;

        if normals.len() != points.len() {
            return Err(ReconstructionError::InvalidInput(format!(
                "exactly one normal per point must be provided ({} points, {} normals)",
                points.len(),
                normals.len()
            )));
        }

        Ok(Self {
            points,
            normals: Some(normals),
        })
    }

    fn validate_points(points: &[Point3<Real>]) -> Result<()> {
        if points.is_empty() {
            return Err(ReconstructionError::InvalidInput(
                "the point set must contain at least one point".to_string(),
            ));
        }

        if let Some(id) = points
            .iter()
            .position(|pt| pt.iter().any(|e| !e.is_finite()))
        {
            return Err(ReconstructionError::InvalidInput(format!(
                "point {id} has a non-finite coordinate: {:?}",
                points[id]
            )));
        }

        Ok(())
    }

    /// The sample positions, in order.
    pub fn points(&self) -> &[Point3<Real>] {
        &self.points
    }

    /// The normals attached to the samples, if any.
    pub fn normals(&self) -> Option<&[Vector3<Real>]> {
        self.normals.as_deref()
    }

    /// The `i`-th sample position.
    pub fn get(&self, i: usize) -> Option<&Point3<Real>> {
        self.points.get(i)
    }

    /// Number of points. Never zero.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: a point set cannot be empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns a copy of this set without the points closer than `tolerance` to an
    /// earlier point of the sequence.
    ///
    /// The first occurrence of a cluster is kept, the relative order of the kept points
    /// is preserved and normals stay attached to their point. Coincident points make the
    /// system matrix singular, so this is the usual remedy after a
    /// [`ReconstructionError::NumericalFailure`].
    pub fn deduplicated(&self, tolerance: Real) -> Result<Self> {
        ensure_positive("deduplication tolerance", tolerance)?;

        let mut grid = HGrid::new(tolerance);
        let mut kept = Vec::with_capacity(self.points.len());

        for (id, pt) in self.points.iter().enumerate() {
            let is_duplicate = grid
                .elements_near(pt, tolerance)
                .any(|other: &usize| na::distance(&self.points[*other], pt) < tolerance);

            if !is_duplicate {
                grid.insert(pt, id);
                kept.push(id);
            }
        }

        let num_removed = self.points.len() - kept.len();
        if num_removed > 0 {
            log::warn!(
                "removed {num_removed} near-duplicate points (tolerance {tolerance:e}), {} left",
                kept.len()
            );
        }

        Ok(Self {
            points: kept.iter().map(|id| self.points[*id]).collect(),
            normals: self
                .normals
                .as_ref()
                .map(|normals| kept.iter().map(|id| normals[*id]).collect()),
        })
    }
}
