use nalgebra::{DVector, Point3};
use rbf_reconstruction::{
    extract_surface_points, ImplicitFunction, Multiquadric, PointSet, RbfReconstruction,
    ReconstructionConfig, ReconstructionError, SamplingGrid, Triangulator,
};

/// Connects consecutive triples of vertices.
struct TriangleSoup;

impl Triangulator for TriangleSoup {
    fn triangulate(&self, vertices: &[Point3<f64>]) -> Vec<[u32; 3]> {
        (0..vertices.len() as u32 / 3)
            .map(|i| [i * 3, i * 3 + 1, i * 3 + 2])
            .collect()
    }
}

fn plane_function() -> ImplicitFunction {
    let points = PointSet::new(vec![
        Point3::new(0.0, 0.0, 0.5),
        Point3::new(0.0, 0.0, -0.5),
    ])
    .unwrap();
    ImplicitFunction::new(
        points,
        DVector::from_column_slice(&[2.0, -2.0]),
        Multiquadric::default(),
    )
    .unwrap()
}

#[test]
fn mesh_vertices_are_the_extracted_points() {
    let grid = SamplingGrid::new(0.2).unwrap();
    let surface = extract_surface_points(&plane_function(), &grid, 1.0e-9).unwrap();
    let extracted = surface.points().to_vec();

    // The zero level-set is the plane z = 0, sampled 11 x 11 times.
    assert_eq!(extracted.len(), 121);
    assert!(extracted.iter().all(|pt| pt.z.abs() < 1.0e-12));

    let mesh = surface.triangulate(&TriangleSoup).unwrap();
    assert_eq!(mesh.vertices(), &extracted[..]);
    assert_eq!(mesh.triangles().len(), 40);
    assert!(mesh
        .flat_indices()
        .all(|i| (i as usize) < mesh.vertices().len()));
}

#[test]
fn triangulator_breaking_its_contract_is_reported() {
    let grid = SamplingGrid::new(0.5).unwrap();
    let surface = extract_surface_points(&plane_function(), &grid, 1.0e-9).unwrap();
    let num_vertices = surface.len();
    let bad = |vertices: &[Point3<f64>]| -> Vec<[u32; 3]> { vec![[0, 1, vertices.len() as u32]] };

    assert_eq!(
        surface.triangulate(&bad).unwrap_err(),
        ReconstructionError::InvalidTriangulation {
            triangle: 0,
            index: num_vertices as u32,
            num_vertices,
        }
    );
}

#[test]
fn session_meshes_the_configured_extraction() {
    let points = PointSet::new(vec![
        Point3::new(0.5, 0.0, 0.0),
        Point3::new(0.0, 0.5, 0.0),
        Point3::new(0.0, 0.0, 0.5),
    ])
    .unwrap();
    let config = ReconstructionConfig::default()
        .with_grid_step(0.5)
        .with_surface_threshold(0.01);
    let rbf = RbfReconstruction::from_points(points, &config).unwrap();

    let expected = rbf.extract_default_surface().unwrap().into_points();
    let mesh = rbf.reconstruct_mesh(&TriangleSoup).unwrap();

    assert_eq!(mesh.vertices(), &expected[..]);
    assert_eq!(mesh.triangles().len(), expected.len() / 3);
}
