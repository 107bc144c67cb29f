// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::event::{Event, EventType};
use crate::id::JobId;
use crate::job::{Job, Stage, Status};

/// A syntactically valid job id for tests that don't care which one.
pub fn sample_job_id() -> JobId {
    JobId::parse("job_abc123").expect("literal id is valid")
}

/// A minimal valid amino-acid sequence, long enough to pass validation.
pub fn sample_sequence() -> String {
    "MKT".repeat(20)
}

/// A freshly `queued` job over [`sample_job_id`] and [`sample_sequence`].
pub fn sample_job() -> Job {
    Job::new(sample_job_id(), sample_sequence(), None, 0)
}

/// A `PROLOGUE` event at `seq` with sensible non-thinking defaults.
pub fn sample_event(job_id: &JobId, seq: u32) -> Event {
    Event::new(job_id, seq, seq as u64, EventType::Prologue, Stage::Model, Status::Running, 10, None, None, None)
}
