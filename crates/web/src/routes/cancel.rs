// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /jobs/:job_id/cancel`.

use crate::dto::CancelResponse;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use fj_core::{JobId, Status};
use tracing::warn;

pub async fn cancel_job(State(state): State<AppState>, Path(job_id): Path<String>) -> Result<Json<CancelResponse>, ApiError> {
    let job_id = JobId::parse(job_id)?;

    // Step 2: read current state; missing -> 404, terminal -> ok:false.
    let job = state.state_store.get(&job_id).await?.ok_or(ApiError::NotFound)?;
    if job.status.is_terminal() {
        return Ok(Json(CancelResponse {
            ok: false,
            job_id: job_id.as_str().to_string(),
            status: job.status,
        }));
    }

    // Step 3: mark_canceled — a single HSET, atomic across instances.
    let canceled = state.state_store.mark_canceled(&job_id, Some("Job canceled by user".to_string())).await?;

    // Step 4: best-effort interrupt against the recorded reasoner session.
    if let Some(session) = state.meta_store.get_reasoner_session(&job_id).await? {
        if let Err(err) = state.reasoner.interrupt(&session).await {
            warn!(job_id = %job_id, %err, "reasoner interrupt failed, cancellation remains authoritative via shared state");
        }
    }

    // Step 5: delete the reasoner session record so a retried cancel
    // can't fire a duplicate interrupt.
    state.meta_store.delete_reasoner_session(&job_id).await?;

    Ok(Json(CancelResponse {
        ok: true,
        job_id: job_id.as_str().to_string(),
        status: canceled.status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use fj_jobstore::{JobMetaStore, JobStateStore};
    use fj_kv::{FakeKv, KeySchema};
    use fj_queue::EventQueue;
    use fj_reasoner::MockReasoner;
    use std::sync::Arc;
    use std::time::Duration;

    fn test_state() -> AppState {
        let kv = Arc::new(FakeKv::new());
        let keys = KeySchema::new("foldjob");
        AppState::new(
            Arc::new(JobStateStore::new(kv.clone(), keys.clone(), 86_400)),
            Arc::new(JobMetaStore::new(kv.clone(), keys.clone(), 86_400)),
            Arc::new(EventQueue::new(kv, keys, 1000)),
            Arc::new(MockReasoner::bundled_default(Duration::from_millis(0), Duration::from_millis(1), fj_reasoner::DelayMode::Random)),
            "inst-1",
            "A".repeat(15),
            86_400,
            86_400,
            true,
        )
    }

    #[tokio::test]
    async fn cancel_unknown_job_is_not_found() {
        let state = test_state();
        let result = cancel_job(State(state), Path("job_doesnotexist".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn cancel_queued_job_succeeds() {
        let state = test_state();
        let job_id = JobId::parse("job_abc123test00000001").unwrap();
        let job = fj_core::Job::new(job_id.clone(), "A".repeat(15), None, 0);
        state.state_store.create(&job).await.unwrap();

        let Json(resp) = cancel_job(State(state), Path(job_id.as_str().to_string())).await.unwrap();
        assert!(resp.ok);
        assert_eq!(resp.status, Status::Canceled);
    }

    #[tokio::test]
    async fn cancel_is_idempotent_on_second_call() {
        let state = test_state();
        let job_id = JobId::parse("job_abc123test00000002").unwrap();
        let job = fj_core::Job::new(job_id.clone(), "A".repeat(15), None, 0);
        state.state_store.create(&job).await.unwrap();

        cancel_job(State(state.clone()), Path(job_id.as_str().to_string())).await.unwrap();
        let Json(second) = cancel_job(State(state), Path(job_id.as_str().to_string())).await.unwrap();
        assert!(!second.ok);
        assert_eq!(second.status, Status::Canceled);
    }
}
