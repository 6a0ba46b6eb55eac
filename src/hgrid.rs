// Uniform spatial hashing, used to find near-coincident input points.

use fnv::FnvHasher;

use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::Real;
use na::{Point3, Vector3};

#[derive(Copy, Clone, Debug, Default)]
pub struct DeterministicState;

impl BuildHasher for DeterministicState {
    type Hasher = FnvHasher;

    fn build_hasher(&self) -> FnvHasher {
        FnvHasher::with_key(1820)
    }
}

/// A grid based on spacial hashing.
#[derive(PartialEq, Debug, Clone)]
pub struct HGrid<T> {
    cells: HashMap<Point3<i64>, Vec<T>, DeterministicState>,
    cell_width: Real,
}

impl<T> HGrid<T> {
    /// Initialize a grid where each cell has the width `cell_width`.
    pub fn new(cell_width: Real) -> Self {
        Self {
            cells: HashMap::with_hasher(DeterministicState),
            cell_width,
        }
    }

    fn quantify(value: Real, cell_width: Real) -> i64 {
        (value / cell_width).floor() as i64
    }

    fn quantify_ceil(value: Real, cell_width: Real) -> i64 {
        (value / cell_width).ceil() as i64
    }

    /// Computes the logical grid cell containing `point`.
    pub fn key(&self, point: &Point3<Real>) -> Point3<i64> {
        Point3::from(point.coords.map(|e| Self::quantify(e, self.cell_width)))
    }

    /// Inserts the given `element` into the cell containing the given `point`.
    pub fn insert(&mut self, point: &Point3<Real>, element: T) {
        let key = self.key(point);
        self.cells.entry(key).or_default().push(element)
    }

    /// An iterator through the elements of all the non-empty cells within `radius` of the
    /// cell containing `point`, that cell included.
    pub fn elements_near(&self, point: &Point3<Real>, radius: Real) -> impl Iterator<Item = &T> {
        let cells = &self.cells;
        let quantified_radius = Self::quantify_ceil(radius, self.cell_width);

        CellRangeIterator::with_center(self.key(point), quantified_radius)
            .filter_map(move |cell| cells.get(&cell))
            .flatten()
    }
}

struct CellRangeIterator {
    start: Point3<i64>,
    end: Point3<i64>,
    curr: Point3<i64>,
    done: bool,
}

impl CellRangeIterator {
    fn with_center(center: Point3<i64>, radius: i64) -> Self {
        let start = center - Vector3::repeat(radius);
        Self {
            start,
            end: center + Vector3::repeat(radius),
            curr: start,
            done: false,
        }
    }
}

impl Iterator for CellRangeIterator {
    type Item = Point3<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.curr == self.end {
            self.done = true;
            Some(self.curr)
        } else {
            let result = self.curr;

            for i in 0..3 {
                self.curr[i] += 1;

                if self.curr[i] > self.end[i] {
                    self.curr[i] = self.start[i];
                } else {
                    break;
                }
            }

            Some(result)
        }
    }
}
