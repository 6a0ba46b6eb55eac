use crate::error::{ReconstructionError, Result};
use crate::Real;
use na::Point3;

/// Turns an ordered sequence of surface samples into triangles.
///
/// Each returned triple indexes into the `vertices` slice given to
/// [`Triangulator::triangulate`].
pub trait Triangulator {
    /// Computes the triangles connecting `vertices`.
    fn triangulate(&self, vertices: &[Point3<Real>]) -> Vec<[u32; 3]>;
}

impl<F> Triangulator for F
where
    F: Fn(&[Point3<Real>]) -> Vec<[u32; 3]>,
{
    fn triangulate(&self, vertices: &[Point3<Real>]) -> Vec<[u32; 3]> {
        self(vertices)
    }
}

/// A triangle mesh whose index buffer is guaranteed to match its vertex buffer.
///
/// Vertices and triangles can only be built and taken apart together, so a renderer
/// cannot pair these indices with another vertex sequence by accident.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-serialize",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SurfaceMesh {
    vertices: Vec<Point3<Real>>,
    triangles: Vec<[u32; 3]>,
}

impl SurfaceMesh {
    /// Bundles `vertices` with `triangles` indexing into them.
    ///
    /// Fails with [`ReconstructionError::InvalidTriangulation`] if an index is out of range.
    pub fn new(vertices: Vec<Point3<Real>>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        for (triangle, idx) in triangles.iter().enumerate() {
            if let Some(index) = idx.iter().find(|i| **i as usize >= vertices.len()) {
                return Err(ReconstructionError::InvalidTriangulation {
                    triangle,
                    index: *index,
                    num_vertices: vertices.len(),
                });
            }
        }

        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// The mesh vertices.
    pub fn vertices(&self) -> &[Point3<Real>] {
        &self.vertices
    }

    /// The mesh triangles, as triples of indices into [`Self::vertices`].
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// The triangles as a flat index buffer.
    pub fn flat_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.triangles.iter().flatten().copied()
    }

    /// Takes the vertex and index buffers out of the mesh, together.
    pub fn into_parts(self) -> (Vec<Point3<Real>>, Vec<[u32; 3]>) {
        (self.vertices, self.triangles)
    }
}
