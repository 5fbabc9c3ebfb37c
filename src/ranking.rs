//! Nearest-center ranking.
//!
//! Every center gets a distance, the list is sorted ascending with a stable
//! sort (equal distances keep catalog order), then truncated to K.

use crate::catalog::{Catalog, ServiceCenter};
use crate::geo::Coordinate;
use serde::Serialize;

/// How many centers the shortlist shows by default.
pub const DEFAULT_TOP_K: usize = 4;

/// A center with its distance from the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCenter {
    #[serde(flatten)]
    pub center: ServiceCenter,
    pub distance_km: f64,
}

/// Rank all centers by distance from `user` and keep the nearest `k`.
///
/// Returns `min(k, catalog.len())` entries; never pads.
pub fn rank_nearest(user: &Coordinate, catalog: &Catalog, k: usize) -> Vec<RankedCenter> {
    let mut ranked: Vec<RankedCenter> = catalog
        .centers()
        .iter()
        .map(|center| RankedCenter {
            distance_km: user.distance_km(&center.location),
            center: center.clone(),
        })
        .collect();

    // Distances are finite (coordinates are validated), so total_cmp agrees
    // with numeric order. `sort_by` is stable.
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(k);
    ranked
}
