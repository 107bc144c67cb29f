// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /jobs/:job_id/sequence`:
//! stores a validated sequence in meta for a job a client will later
//! stream from a different instance.

use crate::dto::{SetSequenceRequest, SetSequenceResponse};
use crate::error::ApiError;
use crate::normalize::validate_override_sequence;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use fj_core::JobId;

pub async fn set_sequence(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(req): Json<SetSequenceRequest>,
) -> Result<Json<SetSequenceResponse>, ApiError> {
    let job_id = JobId::parse(job_id)?;
    let sequence = validate_override_sequence(&req.sequence)?;

    if state.meta_store.exists(&job_id).await? {
        state.meta_store.set_sequence(&job_id, &sequence).await?;
    } else {
        state.meta_store.create(&job_id, &sequence, None).await?;
    }

    Ok(Json(SetSequenceResponse {
        job_id: job_id.as_str().to_string(),
        sequence,
    }))
}
