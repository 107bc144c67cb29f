// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /jobs/:job_id/events`.

use crate::dto::{EventDto, ReplayQuery, ReplayResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use fj_core::JobId;

pub async fn get_events(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(query): Query<ReplayQuery>,
) -> Result<Json<ReplayResponse>, ApiError> {
    let job_id = JobId::parse(job_id)?;
    let offset = query.offset.unwrap_or(0).max(0);
    let total = state.queue.count(&job_id).await?;

    let mut events = state.queue.from_offset(&job_id, offset).await?;
    if let Some(limit) = query.limit {
        let limit = limit.max(0) as usize;
        events.truncate(limit);
    }

    Ok(Json(ReplayResponse {
        job_id: job_id.as_str().to_string(),
        count: events.len(),
        total,
        offset,
        events: events.iter().map(EventDto::from).collect(),
    }))
}
