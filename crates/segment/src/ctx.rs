// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure classification step: one reasoner message in,
//! one service event out. Block/ordinal bookkeeping lives in
//! `SegmentCtx` so the classifier itself stays a straightforward
//! `(message, ctx) -> Event` mapping, an effect-to-event
//! dispatch-by-kind idiom.

use fj_core::{now_ms, Event, EventType, JobId, Stage, Status, StructureArtifact, StructureId};
use fj_reasoner::{ReasonerMessage, ReasonerMessageKind};
use tracing::warn;

/// Mutable state threaded across classification calls within one job's
/// stream: the running event sequence number, the current thinking
/// block index, and the next structure ordinal.
pub struct SegmentCtx {
    job_id: JobId,
    seq: u32,
    current_block: u32,
    next_ordinal: u32,
}

impl SegmentCtx {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            seq: 0,
            current_block: 0,
            next_ordinal: 1,
        }
    }

    fn next_seq(&mut self) -> u32 {
        self.seq += 1;
        self.seq
    }

    /// The bookkeeping event the engine yields before consuming the
    /// reasoner: `THINKING_TEXT`-typed, `stage=QUEUED`,
    /// `progress=0`, `block_index=None` even though the type carries a
    /// block index for every other occurrence.
    pub fn queued_event(&mut self) -> Event {
        let seq = self.next_seq();
        Event::new(
            &self.job_id,
            seq,
            now_ms(),
            EventType::ThinkingText,
            Stage::Queued,
            Status::Queued,
            0,
            Some("Job queued for processing".to_string()),
            None,
            None,
        )
    }

    /// Classify one non-terminal reasoner message into exactly one
    /// event. `progress` has already been interpolated by the caller.
    ///
    /// Reads the attachment's structure file synchronously; on read
    /// failure the message is still emitted — as `THINKING_TEXT`, not
    /// `THINKING_PDB` — and the block is left open, per the
    /// "never skip a reasoner message" rule.
    pub fn classify(&mut self, msg: &ReasonerMessage, progress: u8) -> Event {
        let message = non_empty(msg.content.trim());
        match msg.kind {
            ReasonerMessageKind::Prologue => self.simple(EventType::Prologue, progress, message, None),
            ReasonerMessageKind::Annotation => self.simple(EventType::Annotation, progress, message, None),
            ReasonerMessageKind::Conclusion => {
                // Conclusion is handled by the driver via `conclusion_event`
                // once it observes `msg.is_terminal()`; reachable here only
                // if a non-terminal message is tagged CONCLUSION, which we
                // still segment as thinking text rather than drop.
                self.thinking(msg, progress)
            }
            ReasonerMessageKind::Thinking | ReasonerMessageKind::Unknown => self.thinking(msg, progress),
        }
    }

    fn simple(&mut self, event_type: EventType, progress: u8, message: Option<String>, block_index: Option<u32>) -> Event {
        let seq = self.next_seq();
        Event::new(&self.job_id, seq, now_ms(), event_type, Stage::Model, Status::Running, progress, message, block_index, None)
    }

    fn thinking(&mut self, msg: &ReasonerMessage, progress: u8) -> Event {
        let block_index = self.current_block;
        let message = non_empty(msg.content.trim());

        let Some(attachment) = &msg.attachment else {
            return self.simple(EventType::ThinkingText, progress, message, Some(block_index));
        };

        match std::fs::read_to_string(&attachment.path) {
            Ok(pdb_data) => {
                let ordinal = self.next_ordinal;
                self.next_ordinal += 1;
                let structure_id = StructureId::new(&self.job_id, ordinal);
                let filename = default_filename(&attachment.path, ordinal);
                let artifact = StructureArtifact {
                    structure_id,
                    label: attachment.label.clone(),
                    filename,
                    inline_pdb_data: Some(pdb_data),
                    path: Some(attachment.path.clone()),
                    created_at_ms: now_ms(),
                    cot: msg.content.clone(),
                };
                self.current_block += 1;
                let seq = self.next_seq();
                Event::new(
                    &self.job_id,
                    seq,
                    now_ms(),
                    EventType::ThinkingPdb,
                    Stage::Model,
                    Status::Running,
                    progress,
                    message,
                    Some(block_index),
                    Some(vec![artifact]),
                )
            }
            Err(err) => {
                warn!(path = %attachment.path, %err, "structure attachment unreadable, falling back to THINKING_TEXT");
                self.simple(EventType::ThinkingText, progress, message, Some(block_index))
            }
        }
    }

    /// Terminal event for a `CONCLUSION` message:
    /// `stage=DONE`, `status=complete`, `progress=100`, no block index.
    pub fn conclusion_event(&mut self, msg: &ReasonerMessage) -> Event {
        let seq = self.next_seq();
        Event::new(
            &self.job_id,
            seq,
            now_ms(),
            EventType::Conclusion,
            Stage::Done,
            Status::Complete,
            100,
            non_empty(msg.content.trim()),
            None,
            None,
        )
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn default_filename(path: &str, ordinal: u32) -> String {
    let ext = std::path::Path::new(path).extension().and_then(|e| e.to_str()).unwrap_or("pdb");
    format!("structure_{ordinal}.{ext}")
}

/// Interpolates progress as `min(95, 10 + floor(85 * i / N))`
/// for the `i`-th (1-based) non-bookkeeping, non-terminal message out of a
/// stream of `total` such messages. When `total` isn't knowable up front,
/// falls back to a monotonically increasing approximation that
/// still respects the same bounds.
pub fn interpolate_progress(i: u32, total: Option<u32>) -> u8 {
    match total {
        Some(n) if n > 0 => {
            let pct = 10 + (85 * i as u64 / n as u64) as u32;
            pct.min(95) as u8
        }
        _ => (10 + i.saturating_mul(5)).min(95) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_caps_at_95_with_known_total() {
        assert_eq!(interpolate_progress(1, Some(4)), 10 + 85 / 4);
        assert_eq!(interpolate_progress(4, Some(4)), 95);
    }

    #[test]
    fn progress_never_exceeds_95_without_known_total() {
        for i in 0..50 {
            assert!(interpolate_progress(i, None) <= 95);
        }
    }

    #[test]
    fn queued_event_has_no_block_index() {
        let mut ctx = SegmentCtx::new(fj_core::test_support::sample_job_id());
        let evt = ctx.queued_event();
        assert_eq!(evt.event_type, EventType::ThinkingText);
        assert_eq!(evt.stage, Stage::Queued);
        assert_eq!(evt.block_index, None);
        assert_eq!(evt.seq, 1);
    }

    #[test]
    fn thinking_without_attachment_stays_open_block() {
        let mut ctx = SegmentCtx::new(fj_core::test_support::sample_job_id());
        ctx.queued_event();
        let msg = ReasonerMessage {
            kind: ReasonerMessageKind::Thinking,
            content: "considering".to_string(),
            state: fj_reasoner::ReasonerState::Model,
            attachment: None,
        };
        let evt = ctx.classify(&msg, 50);
        assert_eq!(evt.event_type, EventType::ThinkingText);
        assert_eq!(evt.block_index, Some(0));
    }

    #[test]
    fn thinking_with_unreadable_attachment_falls_back_without_closing_block() {
        let mut ctx = SegmentCtx::new(fj_core::test_support::sample_job_id());
        let msg = ReasonerMessage {
            kind: ReasonerMessageKind::Thinking,
            content: "converged".to_string(),
            state: fj_reasoner::ReasonerState::Model,
            attachment: Some(fj_reasoner::StructureAttachment {
                path: "/nonexistent/path/does-not-exist.pdb".to_string(),
                label: "fold".to_string(),
            }),
        };
        let evt = ctx.classify(&msg, 50);
        assert_eq!(evt.event_type, EventType::ThinkingText);
        assert_eq!(evt.block_index, Some(0));

        // next thinking message still belongs to block 0, since the
        // failed attachment never closed it.
        let msg2 = ReasonerMessage {
            kind: ReasonerMessageKind::Thinking,
            content: "still thinking".to_string(),
            state: fj_reasoner::ReasonerState::Model,
            attachment: None,
        };
        let evt2 = ctx.classify(&msg2, 60);
        assert_eq!(evt2.block_index, Some(0));
    }

    #[test]
    fn thinking_with_readable_attachment_closes_block_and_assigns_ordinal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.pdb");
        std::fs::write(&path, "HEADER\nEND\n").unwrap();

        let mut ctx = SegmentCtx::new(fj_core::test_support::sample_job_id());
        let msg = ReasonerMessage {
            kind: ReasonerMessageKind::Thinking,
            content: "converged".to_string(),
            state: fj_reasoner::ReasonerState::Model,
            attachment: Some(fj_reasoner::StructureAttachment {
                path: path.display().to_string(),
                label: "fold".to_string(),
            }),
        };
        let evt = ctx.classify(&msg, 50);
        assert_eq!(evt.event_type, EventType::ThinkingPdb);
        assert_eq!(evt.block_index, Some(0));
        let artifacts = evt.artifacts.unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].structure_id.as_str(), "str_job_abc123_1");

        // next block starts at 1
        let msg2 = ReasonerMessage {
            kind: ReasonerMessageKind::Thinking,
            content: "next block".to_string(),
            state: fj_reasoner::ReasonerState::Model,
            attachment: None,
        };
        let evt2 = ctx.classify(&msg2, 60);
        assert_eq!(evt2.block_index, Some(1));
    }
}
