// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /jobs/:job_id/stream`: the six-step
//! algorithm that opens a reasoner run, segments it, and relays the
//! result as framed SSE records while polling cancellation at every
//! suspension point.

use crate::dto::{EventDto, StreamQuery};
use crate::error::ApiError;
use crate::normalize::validate_override_sequence;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use fj_core::{now_ms, Event, EventType, Job, JobId};
use futures::StreamExt;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;

/// Mock-mode cooperative re-check cadence.
const MOCK_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub async fn stream_job(State(state): State<AppState>, Path(job_id): Path<String>, Query(query): Query<StreamQuery>) -> Result<Response, ApiError> {
    let job_id = JobId::parse(job_id)?;
    let sequence = resolve_sequence(&state, &job_id, query.sequence.as_deref()).await?;
    let use_mock = query.mock.unwrap_or(state.use_mock);

    if !state.state_store.exists(&job_id).await? {
        let conversation_id = state.meta_store.get_conversation_id(&job_id).await?;
        let job = Job::new(job_id.clone(), sequence.clone(), conversation_id, now_ms());
        state.state_store.create(&job).await?;
    }

    let (tx, rx) = mpsc::channel::<Result<SseEvent, Infallible>>(16);
    tokio::spawn(drive_stream(state, job_id, sequence, use_mock, tx));

    let sse = Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::default());
    let mut response = sse.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert("X-Accel-Buffering", HeaderValue::from_static("no"));
    Ok(response)
}

/// Sequence precedence: query parameter -> meta store
/// -> the compiled-in default.
async fn resolve_sequence(state: &AppState, job_id: &JobId, query_sequence: Option<&str>) -> Result<String, ApiError> {
    if let Some(seq) = query_sequence {
        return validate_override_sequence(seq);
    }
    if let Some(seq) = state.meta_store.get_sequence(job_id).await? {
        return validate_override_sequence(&seq);
    }
    validate_override_sequence(&state.default_sequence)
}

async fn drive_stream(state: AppState, job_id: JobId, sequence: String, use_mock: bool, tx: mpsc::Sender<Result<SseEvent, Infallible>>) {
    let run = match state.reasoner.start(&state.instance_id, job_id.as_str(), &sequence).await {
        Ok(run) => run,
        Err(err) => {
            warn!(job_id = %job_id, %err, "failed to start reasoner session");
            let _ = tx.send(Ok(error_frame(&err.to_string()))).await;
            return;
        }
    };

    if let Err(err) = state.meta_store.set_reasoner_session(&job_id, &run.session).await {
        warn!(job_id = %job_id, %err, "failed to record reasoner session before consuming the stream");
    }

    let mut events = fj_segment::drive(job_id.clone(), run.messages, run.total_hint);
    let mut poll = tokio::time::interval(MOCK_POLL_INTERVAL);
    poll.tick().await;

    let mut saw_conclusion = false;
    let mut last_progress: u8 = 0;

    loop {
        tokio::select! {
            biased;
            _ = poll.tick(), if use_mock => {
                if is_canceled(&state, &job_id).await {
                    send_canceled(&tx, &job_id).await;
                    return;
                }
            }
            next = events.next() => {
                let Some(event) = next else { break };

                if is_canceled(&state, &job_id).await {
                    send_canceled(&tx, &job_id).await;
                    return;
                }

                saw_conclusion = event.event_type == EventType::Conclusion;
                last_progress = event.progress;

                if let Err(err) = state.queue.push(&event, state.events_ttl_secs).await {
                    warn!(job_id = %job_id, %err, "event queue push exhausted its retries, failing the stream");
                    let _ = tx.send(Ok(error_frame(&err.to_string()))).await;
                    return;
                }

                if tx.send(Ok(step_frame(&event))).await.is_err() {
                    return;
                }
            }
        }
    }

    if saw_conclusion {
        state.queue.set_completion_ttl(&job_id, state.events_ttl_secs).await.ok();
        let _ = tx.send(Ok(done_frame(&job_id))).await;
        return;
    }

    // The reasoner closed its stream without a terminal CONCLUSION
    // message: fail the job, emit one final
    // failed event, and suppress the `done` sentinel.
    warn!(job_id = %job_id, "reasoner stream ended without a conclusion event");
    if let Err(err) = state.state_store.mark_failed(&job_id, Some("reasoner stream ended unexpectedly".to_string())).await {
        warn!(job_id = %job_id, %err, "failed to mark job failed after reasoner stream error");
    }
    let next_seq = state.queue.count(&job_id).await.unwrap_or(0) as u32 + 1;
    let failed_event = Event::new(
        &job_id,
        next_seq,
        now_ms(),
        EventType::Conclusion,
        fj_core::Stage::Error,
        fj_core::Status::Failed,
        last_progress,
        Some("reasoner stream ended unexpectedly".to_string()),
        None,
        None,
    );
    let _ = state.queue.push(&failed_event, state.events_ttl_secs).await;
    let _ = tx.send(Ok(step_frame(&failed_event))).await;
}

async fn is_canceled(state: &AppState, job_id: &JobId) -> bool {
    match state.state_store.is_canceled(job_id).await {
        Ok(canceled) => canceled,
        Err(err) => {
            warn!(job_id = %job_id, %err, "cancellation check failed, assuming not canceled");
            false
        }
    }
}

fn step_frame(event: &Event) -> SseEvent {
    let dto = EventDto::from(event);
    SseEvent::default().event("step").data(serde_json::to_string(&dto).unwrap_or_default())
}

fn done_frame(job_id: &JobId) -> SseEvent {
    SseEvent::default().event("done").data(serde_json::json!({ "jobId": job_id.as_str() }).to_string())
}

fn error_frame(message: &str) -> SseEvent {
    SseEvent::default().event("error").data(serde_json::json!({ "error": message }).to_string())
}

async fn send_canceled(tx: &mpsc::Sender<Result<SseEvent, Infallible>>, job_id: &JobId) {
    let frame = SseEvent::default()
        .event("canceled")
        .data(serde_json::json!({ "jobId": job_id.as_str(), "message": "Job canceled by user" }).to_string());
    let _ = tx.send(Ok(frame)).await;
}
