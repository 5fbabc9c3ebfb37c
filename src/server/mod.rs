//! JSON HTTP API over the proximity resolver.

mod handlers;
mod state;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::location::LocationOptions;
use crate::proximity::ProximityResolver;

pub fn build_router(resolver: Arc<ProximityResolver>, location: LocationOptions) -> Router {
    let state = Arc::new(AppState { resolver, location });

    Router::new()
        .route("/api/nearest", get(handlers::nearest))
        .route("/api/centers", get(handlers::centers))
        .route("/api/area", get(handlers::area))
        // Answers depend on where the caller is standing.
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(
    host: &str,
    port: u16,
    resolver: Arc<ProximityResolver>,
    location: LocationOptions,
) -> std::io::Result<()> {
    let app = build_router(resolver, location);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("GOHUBS locator listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await
}
