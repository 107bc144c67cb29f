// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle: the `Status`/`Stage` state machines and the `Job`
//! record that carries them.

use crate::id::JobId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse-grained job status, as seen by API consumers.
///
/// Terminal states are `Complete`, `Failed`, and `Canceled` — once a
/// job enters one of these it never leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Queued,
    Running,
    Partial,
    Complete,
    Failed,
    Canceled,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Complete | Status::Failed | Status::Canceled)
    }

    /// Whether `self -> next` is a legal transition under the status DAG
    /// `queued -> running -> {partial, complete, failed, canceled}`.
    ///
    /// `partial` and `running` both fold back into any of the terminal
    /// states, and cancellation is reachable from every non-terminal
    /// status.
    pub fn can_transition_to(self, next: Status) -> bool {
        use Status::*;
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (Queued, Running) => true,
            (Queued, Canceled) => true,
            (Running, Partial) => true,
            (Running, Complete) => true,
            (Running, Failed) => true,
            (Running, Canceled) => true,
            (Partial, Complete) => true,
            (Partial, Failed) => true,
            (Partial, Canceled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Queued => "queued",
            Status::Running => "running",
            Status::Partial => "partial",
            Status::Complete => "complete",
            Status::Failed => "failed",
            Status::Canceled => "canceled",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Status {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "queued" => Status::Queued,
            "running" => Status::Running,
            "partial" => Status::Partial,
            "complete" => Status::Complete,
            "failed" => Status::Failed,
            "canceled" => Status::Canceled,
            other => return Err(format!("unknown status {other:?}")),
        })
    }
}

/// Pipeline stage, tracking progress through the reasoning pipeline
/// independently of the coarser `Status`.
///
/// DAG: `QUEUED -> MSA -> MODEL -> RELAX -> QA -> DONE`, with `ERROR`
/// reachable from any non-terminal stage and `DONE` reachable from
/// either `RELAX` or `QA` (some jobs skip the QA stage entirely).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Queued,
    Msa,
    Model,
    Relax,
    Qa,
    Done,
    Error,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Error)
    }

    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;
        if self.is_terminal() {
            return false;
        }
        if next == Error {
            return true;
        }
        matches!(
            (self, next),
            (Queued, Msa) | (Msa, Model) | (Model, Relax) | (Relax, Qa) | (Relax, Done) | (Qa, Done)
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Queued => "QUEUED",
            Stage::Msa => "MSA",
            Stage::Model => "MODEL",
            Stage::Relax => "RELAX",
            Stage::Qa => "QA",
            Stage::Done => "DONE",
            Stage::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Stage {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "QUEUED" => Stage::Queued,
            "MSA" => Stage::Msa,
            "MODEL" => Stage::Model,
            "RELAX" => Stage::Relax,
            "QA" => Stage::Qa,
            "DONE" => Stage::Done,
            "ERROR" => Stage::Error,
            other => return Err(format!("unknown stage {other:?}")),
        })
    }
}

/// A protein-folding job and its current lifecycle state.
///
/// `version` starts at 1 when the state record is created and is
/// bumped on every subsequent state-store write; it is the
/// optimistic-concurrency guard for `cas_update` (see `fj-jobstore`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub sequence: String,
    pub conversation_id: Option<String>,
    pub status: Status,
    pub stage: Stage,
    pub progress: u8,
    pub message: Option<String>,
    pub created_at_ms: u64,
    pub completed_at_ms: Option<u64>,
    pub updated_at_ms: u64,
    pub version: u64,
    pub reasoner_session: Option<crate::reasoner_session::ReasonerSession>,
}

impl Job {
    pub fn new(id: JobId, sequence: String, conversation_id: Option<String>, now_ms: u64) -> Self {
        Self {
            id,
            sequence,
            conversation_id,
            status: Status::Queued,
            stage: Stage::Queued,
            progress: 0,
            message: None,
            created_at_ms: now_ms,
            completed_at_ms: None,
            updated_at_ms: now_ms,
            version: 1,
            reasoner_session: None,
        }
    }

    /// Apply a status transition, bumping `version` and `updated_at_ms`.
    /// Returns `false` (no-op) if the transition is not legal.
    pub fn transition_status(&mut self, next: Status, now_ms: u64) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        self.updated_at_ms = now_ms;
        self.version += 1;
        if next.is_terminal() {
            self.completed_at_ms = Some(now_ms);
        }
        true
    }

    pub fn advance_stage(&mut self, next: Stage, now_ms: u64) -> bool {
        if !self.stage.can_advance_to(next) {
            return false;
        }
        self.stage = next;
        self.updated_at_ms = now_ms;
        self.version += 1;
        true
    }

    /// Clamp and set progress. Progress never exceeds 95 until the job
    /// reaches a terminal status, at which point callers should set it
    /// to exactly 100 (complete) or leave it where cancellation/failure
    /// found it.
    pub fn set_progress(&mut self, pct: u8, now_ms: u64) {
        self.progress = pct.min(100);
        self.updated_at_ms = now_ms;
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
