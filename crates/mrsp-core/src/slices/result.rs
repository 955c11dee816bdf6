//! The per-(Z, tool) cell result produced by the multislicer (spec.md §3
//! `ResultSingleTool`).

use crate::geometry::{Path, PolygonSet};

/// The committed output of one (Z, tool) cell, split so that Phase-1 (steps
/// 1–7 of spec.md §4.5) and Phase-2 (steps 8–10) can be computed separately
/// with cross-slice dependencies injected in between.
#[derive(Debug, Clone)]
pub struct ResultSingleTool {
    pub z: f64,
    pub tool: usize,

    /// Committed contours after Phase-1 (and refined in Phase-2 if
    /// infilling/medial-axis steps add rings).
    pub contours: PolygonSet,
    /// Optional separate "contours to show" set (debug/visualization only).
    pub contours_to_show: Option<PolygonSet>,
    /// Open toolpaths emitted across both phases.
    pub toolpaths: Vec<Path>,
    /// Infilling area polygons, present only when `infilling_mode != None`.
    pub infilling_areas: Option<PolygonSet>,
    /// Per-medial-axis independent contours (used for cross-slice dependency
    /// tracking and recursive infilling).
    pub medial_axis_contours: Vec<PolygonSet>,
    /// Per-infilling independent contours (spec.md §4.5 step 7).
    pub infilling_contours: Vec<PolygonSet>,
    /// Scratch mask of already-filled area, consumed at the start of Phase-2
    /// and cleared afterwards.
    pub already_filled: Option<PolygonSet>,

    pub phase1_complete: bool,
    pub phase2_complete: bool,
    /// Set once `giveNextOutputSlice` has handed this result to the caller.
    pub used: bool,

    above_contours: Option<PolygonSet>,
    below_contours: Option<PolygonSet>,
    above_computed: bool,
    below_computed: bool,
}

impl ResultSingleTool {
    pub fn new(z: f64, tool: usize) -> Self {
        Self {
            z,
            tool,
            contours: PolygonSet::empty(),
            contours_to_show: None,
            toolpaths: Vec::new(),
            infilling_areas: None,
            medial_axis_contours: Vec::new(),
            infilling_contours: Vec::new(),
            already_filled: None,
            phase1_complete: false,
            phase2_complete: false,
            used: false,
            above_contours: None,
            below_contours: None,
            above_computed: false,
            below_computed: false,
        }
    }

    /// Memoized "contours above" accessor; `compute` only runs the first
    /// time (or after `clear_contours_above_below`), per spec.md §4.6
    /// `computeContoursAboveAndBelow`.
    pub fn contours_above(&mut self, compute: impl FnOnce() -> PolygonSet) -> &PolygonSet {
        if !self.above_computed {
            self.above_contours = Some(compute());
            self.above_computed = true;
        }
        self.above_contours.as_ref().unwrap()
    }

    pub fn contours_below(&mut self, compute: impl FnOnce() -> PolygonSet) -> &PolygonSet {
        if !self.below_computed {
            self.below_contours = Some(compute());
            self.below_computed = true;
        }
        self.below_contours.as_ref().unwrap()
    }

    pub fn has_above_below_cached(&self) -> bool {
        self.above_computed || self.below_computed
    }

    /// Invalidates the above/below memoization, as required when
    /// `recompute_required_after_support`/`recompute_required_after_overhang`
    /// demand it (spec.md §4.6).
    pub fn clear_contours_above_below(&mut self) {
        self.above_contours = None;
        self.below_contours = None;
        self.above_computed = false;
        self.below_computed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contours_above_memoizes() {
        let mut r = ResultSingleTool::new(1.0, 0);
        let mut calls = 0;
        {
            r.contours_above(|| {
                calls += 1;
                PolygonSet::empty()
            });
        }
        {
            r.contours_above(|| {
                calls += 1;
                PolygonSet::empty()
            });
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn clear_forces_recompute() {
        let mut r = ResultSingleTool::new(1.0, 0);
        let mut calls = 0;
        r.contours_above(|| {
            calls += 1;
            PolygonSet::empty()
        });
        r.clear_contours_above_below();
        r.contours_above(|| {
            calls += 1;
            PolygonSet::empty()
        });
        assert_eq!(calls, 2);
    }
}
