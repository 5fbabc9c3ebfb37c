//! Service-area membership.

use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Slack applied at the radius so a point computed to lie exactly on the
/// boundary is not excluded by rounding (1 mm).
pub const BOUNDARY_TOLERANCE_KM: f64 = 1e-6;

/// A circular operating region around an anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceAreaPolicy {
    pub anchor: Coordinate,
    pub radius_km: f64,
}

impl ServiceAreaPolicy {
    pub fn new(anchor: Coordinate, radius_km: f64) -> Self {
        Self { anchor, radius_km }
    }

    /// Visakhapatnam, 100 km.
    pub fn visakhapatnam() -> Self {
        let anchor = Coordinate::new(17.6868, 83.2185)
            .unwrap_or_else(|e| panic!("default service-area anchor is malformed: {}", e));
        Self::new(anchor, 100.0)
    }

    /// Inclusive: a point exactly `radius_km` away is inside.
    pub fn contains(&self, point: &Coordinate) -> bool {
        point.distance_km(&self.anchor) <= self.radius_km + BOUNDARY_TOLERANCE_KM
    }
}

impl Default for ServiceAreaPolicy {
    fn default() -> Self {
        Self::visakhapatnam()
    }
}
