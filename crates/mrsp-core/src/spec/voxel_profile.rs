//! The polymorphic vertical voxel profile (spec.md §3, §9 Design Notes).
//!
//! Three variants share the interface `(width(zshift), voxel_semi_height,
//! slice_height, application_point, remainder)`. Per the Design Notes, this
//! is modeled as a tagged enum with a small method table rather than a
//! virtual base class.

use serde::{Deserialize, Serialize};

/// A vertical voxel profile: `width = f(zshift)` with finite support
/// `[-application_point, +remainder]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VoxelProfile {
    /// Cylinder: constant width within `|zshift| < semi_height`.
    Constant { radius: f64, semi_height: f64, slice_height: f64 },
    /// Elliptical cross-section along Z.
    Elliptical {
        radius_x: f64,
        radius_z: f64,
        slice_height: f64,
    },
    /// Piecewise-linear width profile, given as `(zshift, width)` control
    /// points sorted by `zshift` ascending; `width` is linearly interpolated
    /// between points and zero outside the given range.
    PiecewiseLinear {
        points: Vec<(f64, f64)>,
        slice_height: f64,
    },
}

impl VoxelProfile {
    pub fn constant(radius: f64, semi_height: f64, slice_height: f64) -> Self {
        VoxelProfile::Constant {
            radius,
            semi_height,
            slice_height,
        }
    }

    pub fn elliptical(radius_x: f64, radius_z: f64, slice_height: f64) -> Self {
        VoxelProfile::Elliptical {
            radius_x,
            radius_z,
            slice_height,
        }
    }

    /// Width of the voxel at vertical offset `zshift` from its centerline.
    pub fn width(&self, zshift: f64) -> f64 {
        match self {
            VoxelProfile::Constant {
                radius,
                semi_height,
                ..
            } => {
                if zshift.abs() < *semi_height {
                    *radius
                } else {
                    0.0
                }
            }
            VoxelProfile::Elliptical {
                radius_x, radius_z, ..
            } => {
                if zshift.abs() < *radius_z {
                    let ratio = zshift / radius_z;
                    radius_x * (1.0 - ratio * ratio).max(0.0).sqrt()
                } else {
                    0.0
                }
            }
            VoxelProfile::PiecewiseLinear { points, .. } => interpolate_piecewise(points, zshift),
        }
    }

    /// True vertical half-extent of the voxel (distinct from `slice_height`,
    /// which may be adjusted purely for slicing-step purposes).
    pub fn voxel_semi_height(&self) -> f64 {
        match self {
            VoxelProfile::Constant { semi_height, .. } => *semi_height,
            VoxelProfile::Elliptical { radius_z, .. } => *radius_z,
            VoxelProfile::PiecewiseLinear { points, .. } => points
                .iter()
                .map(|(z, _)| z.abs())
                .fold(0.0_f64, f64::max),
        }
    }

    pub fn slice_height(&self) -> f64 {
        match self {
            VoxelProfile::Constant { slice_height, .. } => *slice_height,
            VoxelProfile::Elliptical { slice_height, .. } => *slice_height,
            VoxelProfile::PiecewiseLinear { slice_height, .. } => *slice_height,
        }
    }

    /// Support below the centerline (`-application_point`).
    pub fn application_point(&self) -> f64 {
        match self {
            VoxelProfile::PiecewiseLinear { points, .. } => {
                points.iter().map(|(z, _)| *z).fold(0.0_f64, f64::min).abs()
            }
            _ => self.voxel_semi_height(),
        }
    }

    /// Support above the centerline (`+remainder`).
    pub fn remainder(&self) -> f64 {
        match self {
            VoxelProfile::PiecewiseLinear { points, .. } => {
                points.iter().map(|(z, _)| *z).fold(0.0_f64, f64::max)
            }
            _ => self.voxel_semi_height(),
        }
    }
}

fn interpolate_piecewise(points: &[(f64, f64)], zshift: f64) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    if zshift <= points[0].0 || zshift >= points[points.len() - 1].0 {
        return 0.0;
    }
    for w in points.windows(2) {
        let (z0, w0) = w[0];
        let (z1, w1) = w[1];
        if zshift >= z0 && zshift <= z1 {
            if (z1 - z0).abs() < f64::EPSILON {
                return w0;
            }
            let t = (zshift - z0) / (z1 - z0);
            return w0 + t * (w1 - w0);
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_profile_width() {
        let p = VoxelProfile::constant(5.0, 2.0, 4.0);
        assert_eq!(p.width(0.0), 5.0);
        assert_eq!(p.width(1.9), 5.0);
        assert_eq!(p.width(2.1), 0.0);
    }

    #[test]
    fn elliptical_profile_width_at_center_equals_radius_x() {
        let p = VoxelProfile::elliptical(5.0, 2.0, 4.0);
        assert!((p.width(0.0) - 5.0).abs() < 1e-9);
        assert_eq!(p.width(3.0), 0.0);
    }

    #[test]
    fn piecewise_linear_interpolates() {
        let p = VoxelProfile::PiecewiseLinear {
            points: vec![(-2.0, 0.0), (0.0, 4.0), (2.0, 0.0)],
            slice_height: 2.0,
        };
        assert!((p.width(0.0) - 4.0).abs() < 1e-9);
        assert!((p.width(1.0) - 2.0).abs() < 1e-9);
        assert_eq!(p.width(-5.0), 0.0);
    }
}
