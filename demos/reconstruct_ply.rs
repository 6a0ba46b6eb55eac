use nalgebra::{Point3, Vector3};
use ply_rs::{parser, ply};
use rbf_reconstruction::{PointSet, RbfReconstruction, ReconstructionConfig, Real};
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

pub fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./assets/bunny.ply".to_string());
    let point_cloud = parse_file(&path, path.ends_with(".ply"));
    dbg!(point_cloud.len());

    let points = normalize(point_cloud.iter().map(|v| v.pos).collect());
    let normals = point_cloud.iter().map(|v| v.normal).collect();
    let points = PointSet::with_normals(points, normals).unwrap();

    dbg!("Running RBF reconstruction.");
    let config = ReconstructionConfig::default();
    let rbf = match RbfReconstruction::from_points(points.clone(), &config) {
        Ok(rbf) => rbf,
        Err(err) if err.is_recoverable() => {
            println!("{err}, retrying without near-duplicate points");
            RbfReconstruction::from_points(points.deduplicated(1.0e-6).unwrap(), &config).unwrap()
        }
        Err(err) => panic!("{err}"),
    };
    println!("{}", rbf.residual_report());

    dbg!("Extracting surface points.");
    let surface = rbf.extract_default_surface().unwrap();
    println!(
        "Extracted {} surface points out of {} samples.",
        surface.len(),
        surface.samples_evaluated()
    );
}

#[derive(Default)]
struct VertexWithNormal {
    pos: Point3<Real>,
    normal: Vector3<Real>,
}

impl ply::PropertyAccess for VertexWithNormal {
    fn new() -> Self {
        Self::default()
    }

    fn set_property(&mut self, key: String, property: ply::Property) {
        match (key.as_ref(), property) {
            ("x", ply::Property::Float(v)) => self.pos.x = v as Real,
            ("y", ply::Property::Float(v)) => self.pos.y = v as Real,
            ("z", ply::Property::Float(v)) => self.pos.z = v as Real,
            ("nx", ply::Property::Float(v)) => self.normal.x = v as Real,
            ("ny", ply::Property::Float(v)) => self.normal.y = v as Real,
            ("nz", ply::Property::Float(v)) => self.normal.z = v as Real,
            _ => {}
        }
    }
}

fn parse_file(path: impl AsRef<Path>, ply: bool) -> Vec<VertexWithNormal> {
    let f = std::fs::File::open(path).unwrap();
    let mut f = std::io::BufReader::new(f);

    if ply {
        let vertex_parser = parser::Parser::<VertexWithNormal>::new();
        let header = vertex_parser.read_header(&mut f).unwrap();

        let mut vertex_list = Vec::new();
        for (_ignore_key, element) in &header.elements {
            if element.name == "vertex" {
                vertex_list = vertex_parser
                    .read_payload_for_element(&mut f, element, &header)
                    .unwrap();
            }
        }
        vertex_list
    } else {
        // One `x y z nx ny nz` record per line.
        let mut result = vec![];
        for line in f.lines().map_while(Result::ok) {
            let values: Vec<_> = line
                .split_whitespace()
                .filter_map(|elt| f64::from_str(elt).ok())
                .collect();
            if values.len() >= 6 {
                result.push(VertexWithNormal {
                    pos: Point3::new(values[0], values[1], values[2]),
                    normal: Vector3::new(values[3], values[4], values[5]),
                });
            }
        }
        result
    }
}

/// Maps the bounding box of `points` to `[-1, 1]³`, axis by axis.
fn normalize(mut points: Vec<Point3<Real>>) -> Vec<Point3<Real>> {
    let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
    let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);

    for pt in &points {
        mins = mins.inf(pt);
        maxs = maxs.sup(pt);
    }

    let extents = (maxs - mins).map(|e| if e > 0.0 { e } else { 1.0 });

    for pt in &mut points {
        *pt = Point3::from((*pt - mins).component_div(&extents) * 2.0 - Vector3::repeat(1.0));
    }

    points
}
