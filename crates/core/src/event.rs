// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event taxonomy the segmentation engine emits and the SSE driver
//! streams to clients.

use crate::id::{EventId, JobId};
use crate::job::{Stage, Status};
use crate::structure::StructureArtifact;
use serde::{Deserialize, Serialize};

/// The kind of event in a job's stream.
///
/// `THINKING_TEXT` and `THINKING_PDB` are the two halves of a "block":
/// zero or more `THINKING_TEXT` events followed by exactly one
/// `THINKING_PDB` that closes it and carries the synthesized
/// structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Prologue,
    Annotation,
    ThinkingText,
    ThinkingPdb,
    Conclusion,
}

impl EventType {
    /// Whether this event type carries a `block_index`.
    pub fn is_thinking(self) -> bool {
        matches!(self, EventType::ThinkingText | EventType::ThinkingPdb)
    }
}

/// One record in a job's append-only event stream.
///
/// `event_id` encodes `(job_id, seq)`, making redelivery of the same
/// event idempotent on the client side — this is the at-least-once
/// delivery mechanism; there is no separate durability layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: EventId,
    pub job_id: JobId,
    pub seq: u32,
    pub ts_ms: u64,
    pub event_type: EventType,
    pub stage: Stage,
    pub status: Status,
    pub progress: u8,
    pub message: Option<String>,
    pub block_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<StructureArtifact>>,
}

impl Event {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job_id: &JobId,
        seq: u32,
        ts_ms: u64,
        event_type: EventType,
        stage: Stage,
        status: Status,
        progress: u8,
        message: Option<String>,
        block_index: Option<u32>,
        artifacts: Option<Vec<StructureArtifact>>,
    ) -> Self {
        Self {
            event_id: EventId::new(job_id, seq),
            job_id: job_id.clone(),
            seq,
            ts_ms,
            event_type,
            stage,
            status,
            progress,
            message,
            block_index,
            artifacts,
        }
    }
}
