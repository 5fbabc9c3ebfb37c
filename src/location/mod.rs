//! Location acquisition for the GOHUBS locator.
//!
//! Providers produce a single coordinate sample (manual, IP-based, or a
//! cached fix); the workflow turns that sample into a resolution.

pub mod cache;
pub mod providers;
pub mod resolver;
pub mod types;

pub use cache::LocationCache;
pub use providers::{CachedProvider, IpLocationProvider, LocationProvider, ManualProvider, UnsupportedProvider};
pub use resolver::{AttemptId, ResolutionWorkflow, WorkflowState};
pub use types::{LocationFailure, LocationOptions, LocationSample, LocationSource};
