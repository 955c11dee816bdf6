//! Scaling between the mesh's native (floating point) units and the process-
//! wide internal integer coordinate system used by every geometric type in
//! [`crate::geometry`].
//!
//! The internal system exists so that the clipping/offsetting kernel and the
//! Voronoi step in C3 can work with exact integer arithmetic; `scaling` is the
//! factor that converts a native-unit length into internal units (as used by
//! the paths-file `scaling` field, spec.md §6).

use serde::{Deserialize, Serialize};

/// Conversion factor between native mesh units (e.g. millimeters) and the
/// internal integer coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InternalUnits {
    /// Internal units per native unit. A raw X in native units becomes
    /// `round(x_native * scaling)` internal units.
    pub scaling: f64,
}

impl InternalUnits {
    /// Common default: 1000 internal units per native unit (sub-micron
    /// resolution for millimeter-scale native units).
    pub const DEFAULT_SCALING: f64 = 1000.0;

    pub fn new(scaling: f64) -> Self {
        Self { scaling }
    }

    pub fn to_internal(&self, native: f64) -> i64 {
        (native * self.scaling).round() as i64
    }

    pub fn to_native(&self, internal: i64) -> f64 {
        internal as f64 / self.scaling
    }
}

impl Default for InternalUnits {
    fn default() -> Self {
        Self {
            scaling: Self::DEFAULT_SCALING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_close() {
        let u = InternalUnits::default();
        let native = 12.345;
        let internal = u.to_internal(native);
        let back = u.to_native(internal);
        assert!((back - native).abs() < 1e-3);
    }
}
