//! Grid snapping parameters (spec.md §4.2 `SnapToGridSpec`).

/// How a path is snapped onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapMode {
    /// Snap by dilating the contour (grow toward the grid).
    Dilate,
    /// Snap by eroding the contour (shrink toward the grid).
    Erode,
    /// Round each vertex to the nearest grid point, ignoring orientation.
    Simple,
}

/// A regular grid plus the search/cleanup parameters the snapper applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub step_x: f64,
    pub step_y: f64,
    pub shift_x: f64,
    pub shift_y: f64,
    /// Maximum acceptable distance from a vertex to its snapped position.
    pub maxdist: f64,
    pub mode: SnapMode,
    /// If true, drop output edges colinear with the previous edge.
    pub remove_redundant: bool,
    /// Number of grid squares the fallback search should widen to, beyond
    /// the 12-neighbor ring, before giving up (spec.md §4.2).
    pub num_squares: i32,
}

impl GridSpec {
    pub fn new(step_x: f64, step_y: f64, maxdist: f64, mode: SnapMode) -> Self {
        Self {
            step_x,
            step_y,
            shift_x: 0.0,
            shift_y: 0.0,
            maxdist,
            mode,
            remove_redundant: true,
            num_squares: ((maxdist / step_x.min(step_y)).ceil() as i32).max(1),
        }
    }

    /// Index of the grid cell (i, j) such that the cell spans
    /// `[shift + i*step, shift + (i+1)*step)` on each axis, containing `v`.
    pub fn cell_of(&self, x: f64, y: f64) -> (i64, i64) {
        let i = ((x - self.shift_x) / self.step_x).floor() as i64;
        let j = ((y - self.shift_y) / self.step_y).floor() as i64;
        (i, j)
    }

    pub fn grid_point(&self, i: i64, j: i64) -> (f64, f64) {
        (
            self.shift_x + i as f64 * self.step_x,
            self.shift_y + j as f64 * self.step_y,
        )
    }

    /// True if `v` already sits on a grid coordinate along one axis, which
    /// widens the fallback search to 6 cells instead of 12 (spec.md §4.2
    /// "Edge cases").
    pub fn on_grid_line(&self, x: f64, y: f64) -> bool {
        let rx = (x - self.shift_x) / self.step_x;
        let ry = (y - self.shift_y) / self.step_y;
        (rx - rx.round()).abs() < 1e-9 || (ry - ry.round()).abs() < 1e-9
    }
}
