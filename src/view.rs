//! JSON views shared by the CLI output and the HTTP API.

use crate::catalog::ServiceCenter;
use crate::location::{LocationFailure, WorkflowState};
use crate::proximity::{rejection_message, RejectReason};
use serde::Serialize;

/// A center as presented to the user, with its call action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CenterView {
    pub id: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub phone: String,
    pub tel_uri: String,
    pub services: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl CenterView {
    pub fn new(center: &ServiceCenter, distance_km: Option<f64>) -> Self {
        Self {
            id: center.id.clone(),
            name: center.name.clone(),
            address: center.address.clone(),
            lat: center.location.lat(),
            lon: center.location.lon(),
            phone: center.phone.clone(),
            tel_uri: center.tel_uri(),
            services: center.services.clone(),
            distance_km,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ResolutionView {
    Resolved {
        message: String,
        formatted_coords: String,
        centers: Vec<CenterView>,
    },
    Rejected {
        message: String,
        reason: RejectReason,
        #[serde(skip_serializing_if = "Option::is_none")]
        failure: Option<LocationFailure>,
    },
}

impl ResolutionView {
    /// View of a terminal workflow state; `None` while idle or locating.
    pub fn from_state(state: &WorkflowState) -> Option<Self> {
        match state {
            WorkflowState::Resolved { sample, centers } => Some(Self::Resolved {
                message: format!("Found {} GOHUBS centers near you.", centers.len()),
                formatted_coords: sample.coordinate.to_string(),
                centers: centers
                    .iter()
                    .map(|r| CenterView::new(&r.center, Some(r.distance_km)))
                    .collect(),
            }),
            WorkflowState::Rejected { reason, failure } => Some(Self::Rejected {
                message: rejection_message(*reason, *failure).to_string(),
                reason: *reason,
                failure: *failure,
            }),
            WorkflowState::Idle | WorkflowState::Locating { .. } => None,
        }
    }
}
