/*!
Implicit surface reconstruction from point clouds with global multiquadric
Radial Basis Function interpolation.

The points are interpolated by `f(p) = Σ λ_i sqrt(|p - p_i|² + c²)`, which is
solved for with a dense Gaussian elimination, then sampled over a regular grid
of `[-1, 1]³` to extract a discrete approximation of its zero level-set.
*/

#![warn(missing_docs)]

/// Floating-point type used by this library.
pub type Real = f64;

extern crate nalgebra as na;
extern crate parry3d_f64 as parry;

pub use self::config::ReconstructionConfig;
pub use self::error::{ReconstructionError, Result};
pub use self::extraction::{extract_surface_points, ExtractedSurface, SamplingGrid};
pub use self::gaussian_elimination::{solve_gaussian_elimination, DEFAULT_PIVOT_EPSILON};
pub use self::implicit_function::{ImplicitFunction, ResidualEntry, ResidualReport};
pub use self::kernel::{assemble_system, KernelSystem, Multiquadric};
pub use self::mesh::{SurfaceMesh, Triangulator};
pub use self::point_set::PointSet;
pub use self::reconstruction::RbfReconstruction;

mod config;
mod error;
mod extraction;
mod gaussian_elimination;
mod hgrid;
mod implicit_function;
mod kernel;
mod mesh;
mod point_set;
mod reconstruction;
