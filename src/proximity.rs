//! The proximity resolver: service-area check followed by ranking.
//!
//! Pure and synchronous. Holds only read-only configuration, so a single
//! instance can be shared across tasks behind an `Arc` without locking.

use crate::area::ServiceAreaPolicy;
use crate::catalog::Catalog;
use crate::geo::Coordinate;
use crate::location::LocationFailure;
use crate::ranking::{self, RankedCenter, DEFAULT_TOP_K};
use serde::Serialize;
use std::fmt;

/// Why a resolution attempt did not produce a shortlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    /// The user is outside the operating region.
    #[serde(rename = "area")]
    OutsideServiceArea,
    /// No coordinate could be obtained.
    LocationUnavailable,
}

impl RejectReason {
    /// Short machine-readable tag ("area" / "location-unavailable").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutsideServiceArea => "area",
            Self::LocationUnavailable => "location-unavailable",
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::OutsideServiceArea => {
                "GOHUBS services are currently available only in rural areas near Visakhapatnam."
            }
            Self::LocationUnavailable => {
                "Please allow location access to find nearest GOHUBS centers."
            }
        }
    }
}

/// User-facing message for a rejection. A device with no location
/// capability gets its own wording; every other failure asks for access.
pub fn rejection_message(reason: RejectReason, failure: Option<LocationFailure>) -> &'static str {
    match (reason, failure) {
        (RejectReason::LocationUnavailable, Some(LocationFailure::Unsupported)) => {
            "Your browser doesn't support location services."
        }
        _ => reason.user_message(),
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Resolution {
    Resolved {
        centers: Vec<RankedCenter>,
    },
    Rejected {
        reason: RejectReason,
        #[serde(skip_serializing_if = "Option::is_none")]
        failure: Option<LocationFailure>,
    },
}

impl Resolution {
    pub fn outside_area() -> Self {
        Self::Rejected { reason: RejectReason::OutsideServiceArea, failure: None }
    }

    pub fn location_unavailable(failure: LocationFailure) -> Self {
        Self::Rejected { reason: RejectReason::LocationUnavailable, failure: Some(failure) }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    pub fn centers(&self) -> &[RankedCenter] {
        match self {
            Self::Resolved { centers } => centers,
            Self::Rejected { .. } => &[],
        }
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::Resolved { .. } => None,
            Self::Rejected { reason, .. } => Some(*reason),
        }
    }

    /// One-line summary for the user ("Found 4 GOHUBS centers near you.").
    pub fn user_message(&self) -> String {
        match self {
            Self::Resolved { centers } => {
                format!("Found {} GOHUBS centers near you.", centers.len())
            }
            Self::Rejected { reason, failure } => rejection_message(*reason, *failure).to_string(),
        }
    }
}

/// Ranking strategy: user position, catalog and K in, shortlist out.
pub type RankFn = fn(&Coordinate, &Catalog, usize) -> Vec<RankedCenter>;

#[derive(Clone)]
pub struct ProximityResolver {
    catalog: Catalog,
    policy: ServiceAreaPolicy,
    top_k: usize,
    rank: RankFn,
}

impl fmt::Debug for ProximityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProximityResolver")
            .field("catalog", &self.catalog)
            .field("policy", &self.policy)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

impl ProximityResolver {
    pub fn new(catalog: Catalog, policy: ServiceAreaPolicy) -> Self {
        Self { catalog, policy, top_k: DEFAULT_TOP_K, rank: ranking::rank_nearest }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Replace the default nearest-first ranking.
    pub fn with_ranker(mut self, rank: RankFn) -> Self {
        self.rank = rank;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> &ServiceAreaPolicy {
        &self.policy
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn in_service_area(&self, user: &Coordinate) -> bool {
        self.policy.contains(user)
    }

    pub fn nearest(&self, user: &Coordinate) -> Vec<RankedCenter> {
        (self.rank)(user, &self.catalog, self.top_k)
    }

    /// Area check, then ranking. Ranking never runs for an out-of-area user.
    pub fn resolve(&self, user: &Coordinate) -> Resolution {
        if !self.in_service_area(user) {
            tracing::info!(user = %user, "user outside service area");
            return Resolution::outside_area();
        }
        let centers = self.nearest(user);
        tracing::info!(user = %user, count = centers.len(), "resolved nearest centers");
        Resolution::Resolved { centers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn gohubs() -> ProximityResolver {
        ProximityResolver::new(Catalog::builtin(), ServiceAreaPolicy::visakhapatnam())
    }

    fn never_rank(_: &Coordinate, _: &Catalog, _: usize) -> Vec<RankedCenter> {
        panic!("ranking ran for a rejected user");
    }

    fn rank_none(_: &Coordinate, _: &Catalog, _: usize) -> Vec<RankedCenter> {
        Vec::new()
    }

    #[test]
    fn test_end_to_end_user_at_central() {
        let user = Coordinate::new(17.7231, 83.3077).unwrap();
        let resolution = gohubs().resolve(&user);
        assert!(resolution.is_resolved());

        let centers = resolution.centers();
        assert_eq!(centers.len(), 4);
        assert_eq!(centers[0].center.id, "1");
        assert_abs_diff_eq!(centers[0].distance_km, 0.0, epsilon = 1e-9);
        assert!(centers[1].distance_km <= centers[2].distance_km);
        assert!(centers[2].distance_km <= centers[3].distance_km);
        assert_eq!(resolution.user_message(), "Found 4 GOHUBS centers near you.");
    }

    #[test]
    fn test_outside_area_skips_ranking() {
        let user = Coordinate::new(28.6139, 77.2090).unwrap();
        let resolution = gohubs().with_ranker(never_rank).resolve(&user);
        assert_eq!(resolution, Resolution::outside_area());
        assert_eq!(resolution.reject_reason(), Some(RejectReason::OutsideServiceArea));
        assert!(resolution.centers().is_empty());
    }

    #[test]
    fn test_custom_ranker_used_inside_area() {
        let user = Coordinate::new(17.7231, 83.3077).unwrap();
        let resolution = gohubs().with_ranker(rank_none).resolve(&user);
        assert!(resolution.is_resolved());
        assert!(resolution.centers().is_empty());
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            Resolution::outside_area().user_message(),
            "GOHUBS services are currently available only in rural areas near Visakhapatnam."
        );
        assert_eq!(
            Resolution::location_unavailable(LocationFailure::PermissionDenied).user_message(),
            "Please allow location access to find nearest GOHUBS centers."
        );
        assert_eq!(
            Resolution::location_unavailable(LocationFailure::Unsupported).user_message(),
            "Your browser doesn't support location services."
        );
    }

    #[test]
    fn test_single_center_catalog() {
        let single = Catalog::new(vec![Catalog::builtin().centers()[1].clone()]).unwrap();
        let resolver = ProximityResolver::new(single, ServiceAreaPolicy::visakhapatnam());
        let user = Coordinate::new(17.70, 83.20).unwrap();
        let resolution = resolver.resolve(&user);
        assert_eq!(resolution.centers().len(), 1);
        assert_eq!(resolution.centers()[0].center.name, "GOHUBS Anakapalle");
    }

    #[test]
    fn test_top_k_override() {
        let user = Coordinate::new(17.7231, 83.3077).unwrap();
        let resolution = gohubs().with_top_k(2).resolve(&user);
        assert_eq!(resolution.centers().len(), 2);
    }

    #[test]
    fn test_resolution_json_shape() {
        let user = Coordinate::new(17.7231, 83.3077).unwrap();
        let json = serde_json::to_value(gohubs().resolve(&user)).unwrap();
        assert_eq!(json["status"], "resolved");
        assert_eq!(json["centers"][0]["name"], "GOHUBS Visakhapatnam Central");
        assert!(json["centers"][0]["distance_km"].is_number());

        let json = serde_json::to_value(Resolution::outside_area()).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["reason"], "area");
        assert!(json.get("failure").is_none());

        let json = serde_json::to_value(Resolution::location_unavailable(
            LocationFailure::PermissionDenied,
        ))
        .unwrap();
        assert_eq!(json["reason"], "location-unavailable");
        assert_eq!(json["failure"], "permission-denied");
    }
}
