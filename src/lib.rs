//! GOHUBS locator: decides whether a user is inside the GOHUBS service area
//! and ranks the nearest service centers.

pub mod area;
pub mod catalog;
pub mod config;
pub mod geo;
pub mod location;
pub mod logging;
pub mod proximity;
pub mod ranking;
pub mod report;
pub mod server;
pub mod view;

pub use area::ServiceAreaPolicy;
pub use catalog::{Catalog, ServiceCenter};
pub use geo::{distance_km, Coordinate};
pub use proximity::{ProximityResolver, RejectReason, Resolution};
pub use ranking::RankedCenter;
