// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /jobs/:job_id/state`.

use crate::dto::{JobStateDto, StateResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use fj_core::JobId;

pub async fn get_state(State(state): State<AppState>, Path(job_id): Path<String>) -> Result<Json<StateResponse>, ApiError> {
    let job_id = JobId::parse(job_id)?;
    let job = state.state_store.get(&job_id).await?.ok_or(ApiError::NotFound)?;

    Ok(Json(StateResponse {
        job_id: job.id.as_str().to_string(),
        state: JobStateDto {
            status: job.status,
            stage: job.stage,
            progress: job.progress,
            message: job.message,
            updated_at: job.updated_at_ms,
            version: job.version,
        },
    }))
}
