//! Ordered point sequences, closed or open (spec.md §3).

use super::Point;
use serde::{Deserialize, Serialize};

/// An ordered sequence of points. A closed path has an implicit edge from
/// its last point back to its first; an open path's endpoints matter (for
/// motion planning, toolpath emission, etc.). Empty paths are legal but
/// carry no geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Path {
    pub fn closed(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn open(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn front(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn back(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn reversed(&self) -> Path {
        let mut points = self.points.clone();
        points.reverse();
        Path {
            points,
            closed: self.closed,
        }
    }

    /// Returns a new path that repeats its first point as the last point,
    /// turning a closed ring into an explicit "closed-open" path, as used
    /// when toolpaths are emitted (spec.md §4.5 step 4).
    pub fn as_closed_open(&self) -> Path {
        let mut points = self.points.clone();
        if let Some(first) = points.first().copied() {
            if points.last() != Some(&first) {
                points.push(first);
            }
        }
        Path {
            points,
            closed: false,
        }
    }

    /// Length of this path as a sequence of segments (sum of Euclidean edge
    /// lengths); adds the closing edge only when `closed` is true.
    pub fn polyline_length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        let mut total = 0.0;
        for w in self.points.windows(2) {
            total += w[0].distance_to(&w[1]);
        }
        if self.closed {
            total += self.points[self.points.len() - 1].distance_to(&self.points[0]);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_closed_open_appends_first_point() {
        let p = Path::closed(vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10)]);
        let co = p.as_closed_open();
        assert_eq!(co.points.len(), 4);
        assert_eq!(co.points[0], co.points[3]);
        assert!(!co.closed);
    }

    #[test]
    fn polyline_length_open_vs_closed() {
        let open = Path::open(vec![Point::new(0, 0), Point::new(10, 0)]);
        assert!((open.polyline_length() - 10.0).abs() < 1e-9);

        let closed = Path::closed(vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10)]);
        // three open edges + closing edge
        assert!(closed.polyline_length() > 30.0);
    }
}
