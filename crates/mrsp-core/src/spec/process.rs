//! Per-tool configuration, immutable after construction (spec.md §3
//! `ProcessSpec`).

use super::VoxelProfile;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// How a process fills the area left over after its toolpath contour is cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfillingMode {
    None,
    JustContour,
    Concentric,
    RectilinearHorizontal,
    RectilinearVertical,
}

impl Default for InfillingMode {
    fn default() -> Self {
        InfillingMode::None
    }
}

/// Immutable per-tool configuration (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSpec {
    /// In-plane voxel radius; the distance the tool's center must keep from a wall.
    pub radius: i64,
    /// Quantization step when snapping.
    pub gridstep: i64,
    /// Arc approximation tolerance at the radius scale.
    pub arctol_r: f64,
    /// Arc approximation tolerance at the grid scale.
    pub arctol_g: f64,
    /// Small opening radius used when no snap nor clearance is requested.
    pub burr_length: i64,
    /// When positive, toolpath arcs within this distance of a lower-resolution
    /// committed contour are clipped away.
    pub radius_remove_common: i64,
    /// If true, toolpath is rounded to the grid using the snap algorithm.
    pub apply_snap: bool,
    /// Use a small safe-step when snapping to grid.
    pub snap_small_safe_step: bool,
    /// Open the toolpath by ±radius so it never writes over itself.
    pub add_internal_clearance: bool,
    /// Remove unreachable detail before computing the toolpath offset.
    pub do_preprocessing: bool,
    /// Strictly-decreasing factors in (0, 1] used for medial-axis recovery
    /// of narrow regions in the main contour.
    pub medial_axis_factors: Vec<f64>,
    /// Same, applied inside infilling voids.
    pub medial_axis_factors_for_infillings: Vec<f64>,
    pub infilling_mode: InfillingMode,
    /// If true, rectilinear infilling is generated once over the whole area;
    /// if false, per `HoledPolygon`.
    pub infilling_whole: bool,
    /// If true, voids inside the infilling are added back to the contour
    /// pool for finer tools.
    pub infilling_recursive: bool,
    /// Vertical voxel profile (3D scheduling only).
    pub profile: Option<VoxelProfile>,

    /// Dilate-then-intersect amount guaranteeing a new layer's contour
    /// touches the already-solid volume below/above by at least this much
    /// (spec.md §4.6, GLOSSARY "Ensure-attachment offset"). Zero disables it.
    pub ensure_attachment_offset: f64,
    /// When set alongside `ensure_attachment_offset`, narrow artefacts
    /// thinner than this are removed (opened away) before the attachment
    /// inflate step.
    pub ensure_attachment_minimal_offset: f64,
    /// Extra offset applied to supplied support contours before
    /// intersecting them with the input contour (spec.md §4.6).
    pub support_offset: f64,
}

impl ProcessSpec {
    /// A reasonable constant-profile default for a tool of the given radius
    /// and grid step; callers still need to set mode-specific flags.
    pub fn new(radius: i64, gridstep: i64) -> Self {
        Self {
            radius,
            gridstep,
            arctol_r: (radius as f64) * 0.02,
            arctol_g: (gridstep as f64) * 0.02,
            burr_length: gridstep.max(1),
            radius_remove_common: 0,
            apply_snap: false,
            snap_small_safe_step: false,
            add_internal_clearance: false,
            do_preprocessing: true,
            medial_axis_factors: Vec::new(),
            medial_axis_factors_for_infillings: Vec::new(),
            infilling_mode: InfillingMode::None,
            infilling_whole: false,
            infilling_recursive: false,
            profile: None,
            ensure_attachment_offset: 0.0,
            ensure_attachment_minimal_offset: 0.0,
            support_offset: 0.0,
        }
    }

    /// `substep = gridstep/2` (spec.md §4.5 step 1).
    pub fn substep(&self) -> f64 {
        self.gridstep as f64 / 2.0
    }

    /// `dilatestep = substep*1.05` (spec.md §4.5 step 1).
    pub fn dilatestep(&self) -> f64 {
        self.substep() * 1.05
    }

    /// `negFactor = substep*1.1`, used when preprocessing without a
    /// same-kind next process (spec.md §4.5 step 1).
    pub fn neg_factor(&self) -> f64 {
        self.substep() * 1.1
    }

    /// `safestep = gridstep*sqrt(5)/2*1.1`, bumped to `radius` when
    /// `radius > maxdist` (spec.md §4.5 step 3). `maxdist` is the grid
    /// snapper's own search-radius bound (spec.md §4.2); passed in because it
    /// is computed once per [`crate::spec::GlobalSpec`] run, not stored here.
    pub fn safestep(&self, maxdist: f64) -> f64 {
        let base = (self.gridstep as f64) * 5.0_f64.sqrt() / 2.0 * 1.1;
        if (self.radius as f64) > maxdist {
            self.radius as f64
        } else {
            base
        }
    }

    /// `maxdist`, the grid snapper's search-radius bound, derived the same
    /// way `MultiSpec::populateParameters` derives it: a semidiagonal-based
    /// default, bumped (together with `safestep`) when the radius would
    /// otherwise exceed it and `snap_small_safe_step` isn't set.
    pub fn grid_maxdist(&self) -> f64 {
        const SEMIDIAG_FACTOR: f64 = 1.118_033_988_749_895; // sqrt(5)/2
        let base = (self.gridstep as f64) * SEMIDIAG_FACTOR * 1.1;
        if !self.snap_small_safe_step && (self.radius as f64) * 0.95 > base {
            let mut safestep = self.radius as f64;
            if self.add_internal_clearance {
                safestep += self.gridstep as f64;
            }
            safestep * 0.95
        } else {
            base
        }
    }

    /// Validates the per-process invariants the original scheduler enforced
    /// before scheduling: positive radius, decreasing medial-axis factor
    /// lists, and (when snapping) a gridstep no larger than the radius.
    pub fn validate(&self) -> CoreResult<()> {
        if self.radius <= 0 {
            return Err(CoreError::ConfigError(
                "ProcessSpec.radius must be positive".into(),
            ));
        }
        if self.apply_snap && self.gridstep <= 0 {
            return Err(CoreError::ConfigError(
                "ProcessSpec.gridstep must be positive when apply_snap is set".into(),
            ));
        }
        validate_strictly_decreasing(&self.medial_axis_factors, "medial_axis_factors")?;
        validate_strictly_decreasing(
            &self.medial_axis_factors_for_infillings,
            "medial_axis_factors_for_infillings",
        )?;
        Ok(())
    }
}

fn validate_strictly_decreasing(factors: &[f64], field: &str) -> CoreResult<()> {
    for w in factors.windows(2) {
        if !(w[0] > w[1]) {
            return Err(CoreError::ConfigError(format!(
                "{field} must be strictly decreasing, found {} then {}",
                w[0], w[1]
            )));
        }
    }
    for &f in factors {
        if !(f > 0.0 && f <= 1.0) {
            return Err(CoreError::ConfigError(format!(
                "{field} entries must be in (0, 1], found {f}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substep_and_dilatestep() {
        let p = ProcessSpec::new(100, 10);
        assert_eq!(p.substep(), 5.0);
        assert!((p.dilatestep() - 5.25).abs() < 1e-9);
    }

    #[test]
    fn grid_maxdist_matches_semidiagonal_default() {
        let p = ProcessSpec::new(100, 10);
        let expected = 10.0 * 1.118_033_988_749_895 * 1.1;
        assert!((p.grid_maxdist() - expected).abs() < 1e-9);
    }

    #[test]
    fn grid_maxdist_bumped_when_radius_dominates() {
        let mut p = ProcessSpec::new(1000, 10);
        p.snap_small_safe_step = false;
        let bumped_safestep = 1000.0_f64 * 0.95;
        assert!((p.grid_maxdist() - bumped_safestep).abs() < 1e-9);
    }

    #[test]
    fn safestep_bumped_to_radius_when_exceeding_maxdist() {
        let mut p = ProcessSpec::new(100, 10);
        p.radius = 1000;
        let maxdist = 50.0;
        assert_eq!(p.safestep(maxdist), 1000.0);
    }

    #[test]
    fn validate_rejects_nonmonotonic_medial_axis_factors() {
        let mut p = ProcessSpec::new(100, 10);
        p.medial_axis_factors = vec![0.8, 0.8];
        assert!(p.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_spec() {
        let mut p = ProcessSpec::new(100, 10);
        p.medial_axis_factors = vec![0.8, 0.5, 0.2];
        assert!(p.validate().is_ok());
    }
}
