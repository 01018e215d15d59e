//! Closed outline polygons in world coordinates.

use serde::Serialize;

/// Ordered corner points of one closed outline.
///
/// The closing edge from the last point back to the first is implicit; the
/// first point is never repeated at the end.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Polygon {
    points: Vec<(f64, f64)>,
}

impl Polygon {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Scale lattice corners by the cell size into world coordinates.
    pub fn from_corners(corners: &[(i64, i64)], cell_size: f64) -> Self {
        let points = corners
            .iter()
            .map(|&(gx, gz)| (gx as f64 * cell_size, gz as f64 * cell_size))
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// X coordinates, in point order
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.0).collect()
    }

    /// Z coordinates, in point order
    pub fn zs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.1).collect()
    }

    /// Shoelace area. Positive for clockwise winding with z pointing down,
    /// which is how the boundary tracer walks.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let mut twice_area = 0.0;
        for i in 0..n {
            let (x1, z1) = self.points[i];
            let (x2, z2) = self.points[(i + 1) % n];
            twice_area += x1 * z2 - x2 * z1;
        }
        twice_area / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Bounding box as (min_x, min_z, max_x, max_z), `None` when empty.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let (&(x0, z0), rest) = self.points.split_first()?;
        Some(rest.iter().fold((x0, z0, x0, z0), |(min_x, min_z, max_x, max_z), &(x, z)| {
            (min_x.min(x), min_z.min(z), max_x.max(x), max_z.max(z))
        }))
    }
}
