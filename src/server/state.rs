use crate::location::LocationOptions;
use crate::proximity::ProximityResolver;
use std::sync::Arc;

pub struct AppState {
    pub resolver: Arc<ProximityResolver>,
    pub location: LocationOptions,
}
