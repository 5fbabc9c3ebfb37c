use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::geo::Coordinate;
use crate::location::{ManualProvider, ResolutionWorkflow};
use crate::view::{CenterView, ResolutionView};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/nearest ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct NearestQuery {
    pub lat: Option<f64>,
    #[serde(alias = "lng")]
    pub lon: Option<f64>,
}

pub async fn nearest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearestQuery>,
) -> Result<Json<ResolutionView>, ApiError> {
    let start = Instant::now();

    let (lat, lon) = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return Err(api_error(StatusCode::BAD_REQUEST, "Provide 'lat' and 'lon' parameters")),
    };
    let user = Coordinate::new(lat, lon)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let provider = ManualProvider::new(user);
    let mut workflow = ResolutionWorkflow::new(state.resolver.clone());
    let response = ResolutionView::from_state(workflow.run(&provider, &state.location).await)
        .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Resolution did not complete"))?;

    let outcome = match &response {
        ResolutionView::Resolved { centers, .. } => format!("{} centers", centers.len()),
        ResolutionView::Rejected { reason, .. } => format!("rejected ({})", reason),
    };
    tracing::info!(
        "GET /api/nearest lat={} lon={} -> {} ({:.1}ms)",
        lat,
        lon,
        outcome,
        start.elapsed().as_secs_f64() * 1000.0,
    );

    Ok(Json(response))
}

// ─── GET /api/centers ────────────────────────────────────────────

pub async fn centers(State(state): State<Arc<AppState>>) -> Json<Vec<CenterView>> {
    Json(
        state
            .resolver
            .catalog()
            .centers()
            .iter()
            .map(|c| CenterView::new(c, None))
            .collect(),
    )
}

// ─── GET /api/area ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AreaResponse {
    pub anchor: Coordinate,
    pub formatted_anchor: String,
    pub radius_km: f64,
    pub top_k: usize,
}

pub async fn area(State(state): State<Arc<AppState>>) -> Json<AreaResponse> {
    let policy = state.resolver.policy();
    Json(AreaResponse {
        anchor: policy.anchor,
        formatted_anchor: policy.anchor.to_string(),
        radius_km: policy.radius_km,
        top_k: state.resolver.top_k(),
    })
}
