// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /jobs`.

use crate::dto::{CreateJobRequest, CreateJobResponse, JobDto};
use crate::error::ApiError;
use crate::normalize::resolve_create_sequence;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use fj_core::{now_ms, Job, JobId};

pub async fn create_job(State(state): State<AppState>, Json(req): Json<CreateJobRequest>) -> Result<Json<CreateJobResponse>, ApiError> {
    let sequence = resolve_create_sequence(req.sequence.as_deref(), req.fasta_content.as_deref())?;

    let job_id = JobId::generate();
    let job = Job::new(job_id.clone(), sequence.clone(), req.conversation_id.clone(), now_ms());

    state.meta_store.create(&job_id, &sequence, req.conversation_id.as_deref()).await?;
    state.state_store.create(&job).await?;

    Ok(Json(CreateJobResponse {
        job_id: job_id.as_str().to_string(),
        job: JobDto::from(&job),
    }))
}
