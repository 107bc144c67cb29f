// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives a reasoner message stream end-to-end into a lazy, finite
//! stream of service events. The caller (`fj-web`'s SSE
//! driver) owns recording the reasoner session and pushing/writing
//! each event; this module only knows how to segment.

use crate::ctx::{interpolate_progress, SegmentCtx};
use fj_core::{Event, JobId};
use fj_reasoner::ReasonerMessageStream;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Spawns the consuming loop onto the runtime and returns the
/// resulting event stream. Not restartable: each call owns the
/// message stream it's given and consumes it exactly once.
pub fn drive(job_id: JobId, messages: ReasonerMessageStream, total_hint: Option<u32>) -> BoxStream<'static, Event> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(run_loop(job_id, messages, total_hint, tx));
    ReceiverStream::new(rx).boxed()
}

async fn run_loop(job_id: JobId, mut messages: ReasonerMessageStream, total_hint: Option<u32>, tx: mpsc::Sender<Event>) {
    let mut ctx = SegmentCtx::new(job_id);

    if tx.send(ctx.queued_event()).await.is_err() {
        return;
    }

    let mut i: u32 = 0;
    while let Some(msg) = messages.next().await {
        if msg.is_terminal() {
            let event = ctx.conclusion_event(&msg);
            let _ = tx.send(event).await;
            continue;
        }
        i += 1;
        let progress = interpolate_progress(i, total_hint);
        let event = ctx.classify(&msg, progress);
        if tx.send(event).await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fj_core::test_support::sample_job_id;
    use fj_reasoner::{ReasonerMessage, ReasonerMessageKind, ReasonerState, StructureAttachment};
    use futures::stream;

    fn job_id() -> JobId {
        sample_job_id()
    }

    #[tokio::test]
    async fn queued_to_done_matches_seed_scenario_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.pdb");
        std::fs::write(&path, "HEADER\nEND\n").unwrap();

        let messages = vec![
            ReasonerMessage {
                kind: ReasonerMessageKind::Prologue,
                content: "starting".into(),
                state: ReasonerState::Model,
                attachment: None,
            },
            ReasonerMessage {
                kind: ReasonerMessageKind::Annotation,
                content: "annotated".into(),
                state: ReasonerState::Model,
                attachment: None,
            },
            ReasonerMessage {
                kind: ReasonerMessageKind::Thinking,
                content: "thinking 1".into(),
                state: ReasonerState::Model,
                attachment: None,
            },
            ReasonerMessage {
                kind: ReasonerMessageKind::Thinking,
                content: "thinking 2".into(),
                state: ReasonerState::Model,
                attachment: None,
            },
            ReasonerMessage {
                kind: ReasonerMessageKind::Thinking,
                content: "converged".into(),
                state: ReasonerState::Model,
                attachment: Some(StructureAttachment {
                    path: path.display().to_string(),
                    label: "fold".into(),
                }),
            },
            ReasonerMessage {
                kind: ReasonerMessageKind::Conclusion,
                content: "done".into(),
                state: ReasonerState::Done,
                attachment: None,
            },
        ];
        let total = Some(messages.len() as u32);
        let stream = stream::iter(messages).boxed();

        let events: Vec<Event> = drive(job_id(), stream, total).collect().await;

        assert_eq!(events.len(), 7);
        assert_eq!(events[0].stage, fj_core::Stage::Queued);
        assert_eq!(events[0].progress, 0);

        for evt in &events[1..5] {
            assert_eq!(evt.block_index, Some(0));
            assert!(evt.progress >= 10 && evt.progress <= 95);
        }
        assert_eq!(events[5].event_type, fj_core::EventType::ThinkingPdb);
        assert_eq!(events[5].artifacts.as_ref().unwrap().len(), 1);

        let last = events.last().unwrap();
        assert_eq!(last.event_type, fj_core::EventType::Conclusion);
        assert_eq!(last.stage, fj_core::Stage::Done);
        assert_eq!(last.progress, 100);

        let seqs: Vec<u32> = events.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, (1..=7).collect::<Vec<_>>());
    }
}
