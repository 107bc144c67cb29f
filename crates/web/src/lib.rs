// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Axum HTTP surface: job create, sequence
//! pre-registration, the SSE stream driver, cancel, event replay, and
//! state lookup, plus the ambient `/healthz` probe.

mod dto;
mod error;
mod normalize;
mod routes;
mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the full router over `state`. `cors_origins` is the
/// comma-separated allow-list from `FOLDJOB_CORS_ORIGINS`; an empty
/// list disables CORS entirely, matching the "empty (no
/// CORS)" default.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let mut router = Router::new()
        .route("/jobs", post(routes::create::create_job))
        .route("/jobs/:job_id/sequence", post(routes::sequence::set_sequence))
        .route("/jobs/:job_id/stream", get(routes::stream::stream_job))
        .route("/jobs/:job_id/cancel", post(routes::cancel::cancel_job))
        .route("/jobs/:job_id/events", get(routes::replay::get_events))
        .route("/jobs/:job_id/state", get(routes::job_state::get_state))
        .route("/healthz", get(routes::health::healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if !cors_origins.is_empty() {
        let origins: Vec<_> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        router = router.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
                .max_age(Duration::from_secs(3600)),
        );
    }

    router
}
