//! Resolution workflow: drives one location request into a resolution.
//!
//! Idle → Locating → Resolved | Rejected
//!
//! Waiting on the provider is the only suspension point. Each attempt gets a
//! fresh id; a completion carrying any other id is stale and dropped, so an
//! abandoned request can never overwrite a newer state.

use super::providers::LocationProvider;
use super::types::{LocationFailure, LocationOptions, LocationSample};
use crate::proximity::{ProximityResolver, RejectReason, Resolution};
use crate::ranking::RankedCenter;
use std::sync::Arc;

/// Identifies one resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Idle,
    Locating { attempt: AttemptId },
    Resolved { sample: LocationSample, centers: Vec<RankedCenter> },
    Rejected { reason: RejectReason, failure: Option<LocationFailure> },
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved { .. } | Self::Rejected { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Locating { .. } => "locating",
            Self::Resolved { .. } => "resolved",
            Self::Rejected { .. } => "rejected",
        }
    }

    /// The resolution a terminal state represents.
    pub fn resolution(&self) -> Option<Resolution> {
        match self {
            Self::Resolved { centers, .. } => Some(Resolution::Resolved { centers: centers.clone() }),
            Self::Rejected { reason, failure } => {
                Some(Resolution::Rejected { reason: *reason, failure: *failure })
            }
            Self::Idle | Self::Locating { .. } => None,
        }
    }
}

/// One user's "find nearest" flow.
pub struct ResolutionWorkflow {
    resolver: Arc<ProximityResolver>,
    state: WorkflowState,
    next_attempt: u64,
}

impl ResolutionWorkflow {
    pub fn new(resolver: Arc<ProximityResolver>) -> Self {
        Self { resolver, state: WorkflowState::Idle, next_attempt: 0 }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Start a new attempt. Whatever came before (including an outstanding
    /// request) is discarded: the state passes through Idle into Locating.
    pub fn begin(&mut self) -> AttemptId {
        self.transition(WorkflowState::Idle);
        let attempt = AttemptId(self.next_attempt);
        self.next_attempt += 1;
        self.transition(WorkflowState::Locating { attempt });
        attempt
    }

    /// The caller gave up waiting. A later completion for the abandoned
    /// attempt is ignored.
    pub fn abandon(&mut self) {
        if let WorkflowState::Locating { attempt } = self.state {
            tracing::debug!(attempt = attempt.0, "location attempt abandoned");
        }
        self.transition(WorkflowState::Idle);
    }

    /// Apply the provider's answer for `attempt`.
    ///
    /// Returns the new terminal state, or `None` if the answer is stale.
    pub fn complete(
        &mut self,
        attempt: AttemptId,
        result: Result<LocationSample, LocationFailure>,
    ) -> Option<&WorkflowState> {
        match self.state {
            WorkflowState::Locating { attempt: current } if current == attempt => {}
            _ => {
                tracing::debug!(attempt = attempt.0, state = self.state.label(), "ignoring stale location result");
                return None;
            }
        }

        let next = match result {
            Err(failure) => {
                tracing::warn!(%failure, "location unavailable");
                WorkflowState::Rejected {
                    reason: RejectReason::LocationUnavailable,
                    failure: Some(failure),
                }
            }
            Ok(sample) => match self.resolver.resolve(&sample.coordinate) {
                Resolution::Resolved { centers } => WorkflowState::Resolved { sample, centers },
                Resolution::Rejected { reason, failure } => WorkflowState::Rejected { reason, failure },
            },
        };
        self.transition(next);
        Some(&self.state)
    }

    /// Begin an attempt, await the provider, and complete it.
    pub async fn run<P>(&mut self, provider: &P, opts: &LocationOptions) -> &WorkflowState
    where
        P: LocationProvider + ?Sized,
    {
        let attempt = self.begin();
        let result = provider.request_location(opts).await;
        self.complete(attempt, result);
        &self.state
    }

    fn transition(&mut self, next: WorkflowState) {
        tracing::debug!(from = self.state.label(), to = next.label(), "workflow transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::ServiceAreaPolicy;
    use crate::catalog::Catalog;
    use crate::geo::Coordinate;
    use crate::location::types::LocationSource;
    use approx::assert_abs_diff_eq;
    use async_trait::async_trait;

    struct ScriptedProvider(Result<Coordinate, LocationFailure>);

    #[async_trait]
    impl LocationProvider for ScriptedProvider {
        async fn request_location(
            &self,
            _opts: &LocationOptions,
        ) -> Result<LocationSample, LocationFailure> {
            self.0.map(|c| LocationSample::new(c, LocationSource::Manual))
        }
    }

    fn resolver() -> ProximityResolver {
        ProximityResolver::new(Catalog::builtin(), ServiceAreaPolicy::visakhapatnam())
    }

    fn workflow() -> ResolutionWorkflow {
        ResolutionWorkflow::new(Arc::new(resolver()))
    }

    fn never_rank(_: &Coordinate, _: &Catalog, _: usize) -> Vec<RankedCenter> {
        panic!("ranking ran without a location");
    }

    fn sample(lat: f64, lon: f64) -> LocationSample {
        LocationSample::new(Coordinate::new(lat, lon).unwrap(), LocationSource::Manual)
    }

    #[test]
    fn test_starts_idle() {
        assert_eq!(workflow().state(), &WorkflowState::Idle);
    }

    #[test]
    fn test_begin_enters_locating() {
        let mut wf = workflow();
        let attempt = wf.begin();
        assert_eq!(wf.state(), &WorkflowState::Locating { attempt });
        assert!(!wf.state().is_terminal());
    }

    #[tokio::test]
    async fn test_resolved_end_to_end() {
        let mut wf = workflow();
        let provider = ScriptedProvider(Ok(Coordinate::new(17.7231, 83.3077).unwrap()));
        let state = wf.run(&provider, &LocationOptions::default()).await;

        match state {
            WorkflowState::Resolved { centers, sample } => {
                assert_eq!(sample.source, LocationSource::Manual);
                assert_eq!(centers.len(), 4);
                assert_eq!(centers[0].center.id, "1");
                assert_abs_diff_eq!(centers[0].distance_km, 0.0, epsilon = 1e-9);
                assert!(centers.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
            }
            other => panic!("expected Resolved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_permission_denied_never_ranks() {
        let mut wf = ResolutionWorkflow::new(Arc::new(resolver().with_ranker(never_rank)));
        let provider = ScriptedProvider(Err(LocationFailure::PermissionDenied));
        let state = wf.run(&provider, &LocationOptions::default()).await.clone();

        assert_eq!(
            state,
            WorkflowState::Rejected {
                reason: RejectReason::LocationUnavailable,
                failure: Some(LocationFailure::PermissionDenied),
            }
        );
        assert_eq!(
            state.resolution(),
            Some(Resolution::location_unavailable(LocationFailure::PermissionDenied))
        );
    }

    #[tokio::test]
    async fn test_timeout_is_location_unavailable() {
        let mut wf = workflow();
        let provider = ScriptedProvider(Err(LocationFailure::Timeout));
        let state = wf.run(&provider, &LocationOptions::default()).await;
        assert!(matches!(
            state,
            WorkflowState::Rejected { reason: RejectReason::LocationUnavailable, .. }
        ));
    }

    #[tokio::test]
    async fn test_outside_area_rejected() {
        let mut wf = ResolutionWorkflow::new(Arc::new(resolver().with_ranker(never_rank)));
        // Chennai
        let provider = ScriptedProvider(Ok(Coordinate::new(13.0827, 80.2707).unwrap()));
        let state = wf.run(&provider, &LocationOptions::default()).await;
        assert_eq!(
            state,
            &WorkflowState::Rejected { reason: RejectReason::OutsideServiceArea, failure: None }
        );
    }

    #[test]
    fn test_stale_result_after_abandon_ignored() {
        let mut wf = workflow();
        let attempt = wf.begin();
        wf.abandon();
        assert_eq!(wf.state(), &WorkflowState::Idle);

        assert!(wf.complete(attempt, Ok(sample(17.7231, 83.3077))).is_none());
        assert_eq!(wf.state(), &WorkflowState::Idle);
    }

    #[test]
    fn test_stale_result_from_superseded_attempt_ignored() {
        let mut wf = workflow();
        let first = wf.begin();
        let second = wf.begin();
        assert_ne!(first, second);

        assert!(wf.complete(first, Err(LocationFailure::Timeout)).is_none());
        assert_eq!(wf.state(), &WorkflowState::Locating { attempt: second });

        let state = wf.complete(second, Ok(sample(17.7231, 83.3077))).unwrap();
        assert!(matches!(state, WorkflowState::Resolved { .. }));
    }

    #[test]
    fn test_terminal_state_ignores_late_completion() {
        let mut wf = workflow();
        let attempt = wf.begin();
        wf.complete(attempt, Err(LocationFailure::Unavailable)).unwrap();
        assert!(wf.complete(attempt, Ok(sample(17.7231, 83.3077))).is_none());
        assert!(matches!(wf.state(), WorkflowState::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_retry_after_rejection() {
        let mut wf = workflow();
        let denied = ScriptedProvider(Err(LocationFailure::PermissionDenied));
        wf.run(&denied, &LocationOptions::default()).await;
        assert!(wf.state().is_terminal());

        let granted = ScriptedProvider(Ok(Coordinate::new(17.6911, 83.0034).unwrap()));
        let state = wf.run(&granted, &LocationOptions::default()).await;
        match state {
            WorkflowState::Resolved { centers, .. } => assert_eq!(centers[0].center.id, "2"),
            other => panic!("expected Resolved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_with_dyn_provider() {
        let mut wf = workflow();
        let provider: Box<dyn LocationProvider> =
            Box::new(ScriptedProvider(Ok(Coordinate::new(17.8428, 82.8664).unwrap())));
        let state = wf.run(provider.as_ref(), &LocationOptions::default()).await;
        assert!(state.resolution().unwrap().is_resolved());
    }
}
