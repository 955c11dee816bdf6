//! Integer and 3D points (spec.md §3).

use serde::{Deserialize, Serialize};

/// A 2D integer point in the process-wide internal coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn as_f64(&self) -> (f64, f64) {
        (self.x as f64, self.y as f64)
    }

    /// Euclidean distance as `f64`. Adequate once coordinates are bounded by
    /// the 31-bit-safe range; for the unbounded case prefer
    /// [`crate::geometry::distance_sq_i128`].
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A 3D point: the 2D integer point's X/Y plus a floating-point Z (spec.md
/// §3, "3D variant adds Z as a double").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: i64,
    pub y: i64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: i64, y: i64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
